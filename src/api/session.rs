//! Explicit auth session handed to the gateway.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zendulge_domain::User;

#[derive(Debug, Clone, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    business_id: Option<String>,
}

/// Shared, cloneable handle on the signed-in user. Cloned handles see the
/// same state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a signed-in session, replacing any previous one.
    pub fn begin(&self, token: impl Into<String>, user: User) {
        let mut state = self.write();
        state.token = Some(token.into());
        state.user = Some(user);
        state.business_id = None;
    }

    pub fn end(&self) {
        *self.write() = SessionState::default();
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.read().user.as_ref().map(|user| user.id.clone())
    }

    pub fn select_business(&self, business_id: impl Into<String>) {
        self.write().business_id = Some(business_id.into());
    }

    pub fn business_id(&self) -> Option<String> {
        self.read().business_id.clone()
    }
}
