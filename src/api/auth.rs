//! Login, registration and server-side saved deals.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;
use zendulge_domain::{BusinessRegistration, Credentials, CustomerRegistration, User};

use super::adapters::{Normalize, WireUser};
use super::client::ApiClient;
use super::error::GatewayError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAuth {
    #[serde(default, alias = "accessToken")]
    token: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
}

impl WireAuth {
    fn into_user(self) -> Result<(Option<String>, User), GatewayError> {
        let user = self
            .user
            .ok_or_else(|| GatewayError::Decode("auth response has no user".to_string()))?
            .normalize()?;
        Ok((self.token, user))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDealBody<'a> {
    deal_id: &'a str,
}

/// Server-side bookmark store used to sync guest saves.
#[async_trait]
pub trait SavedDeals: Send + Sync {
    async fn save_deal(&self, deal_id: &str) -> Result<(), GatewayError>;
}

impl ApiClient {
    /// Signs in and populates the session.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, GatewayError> {
        let auth: WireAuth = self
            .send_json(Method::POST, "/auth/login", credentials)
            .await?;
        let (token, user) = auth.into_user()?;
        let token =
            token.ok_or_else(|| GatewayError::Decode("login response has no token".to_string()))?;
        self.session().begin(token, user.clone());
        info!(user = %user.id, role = %user.role, "signed in");
        Ok(user)
    }

    /// Drops the local session. The backend keeps no server-side state.
    pub fn logout(&self) {
        if let Some(user) = self.session().user_id() {
            info!(user = %user, "signed out");
        }
        self.session().end();
    }

    pub async fn register_customer(
        &self,
        registration: &CustomerRegistration,
    ) -> Result<User, GatewayError> {
        self.register(registration).await
    }

    pub async fn register_business(
        &self,
        registration: &BusinessRegistration,
    ) -> Result<User, GatewayError> {
        self.register(registration).await
    }

    async fn register<B: Serialize + Sync>(&self, body: &B) -> Result<User, GatewayError> {
        let auth: WireAuth = self
            .send_json(Method::POST, "/auth/register", body)
            .await?;
        let (_, user) = auth.into_user()?;
        info!(user = %user.id, role = %user.role, "registered");
        Ok(user)
    }
}

#[async_trait]
impl SavedDeals for ApiClient {
    async fn save_deal(&self, deal_id: &str) -> Result<(), GatewayError> {
        self.send_unit(
            Method::POST,
            "/users/me/saved-deals",
            Some(&SaveDealBody { deal_id }),
        )
        .await
    }
}
