//! Deals bookmarked before signing in.
//!
//! Guests keep their saved deal ids in the local store under
//! [`GUEST_SAVES_KEY`]. After login every id is pushed to the backend and
//! the ones that synced are dropped locally; failures stay for the next
//! attempt.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::api::{GatewayError, SavedDeals};
use crate::storage::{LocalStore, StorageError};

pub const GUEST_SAVES_KEY: &str = "guestSavedDeals";

#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub failed: Vec<(String, GatewayError)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GuestSaves {
    store: Arc<LocalStore>,
}

impl GuestSaves {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Saved ids in insertion order.
    pub fn ids(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.store.get(GUEST_SAVES_KEY)?.unwrap_or_default())
    }

    pub fn contains(&self, deal_id: &str) -> Result<bool, StorageError> {
        Ok(self.ids()?.iter().any(|id| id == deal_id))
    }

    /// Returns `false` when the id was already saved.
    pub fn add(&self, deal_id: &str) -> Result<bool, StorageError> {
        self.store.update(GUEST_SAVES_KEY, |ids: Option<Vec<String>>| {
            let mut ids = ids.unwrap_or_default();
            if ids.iter().any(|id| id == deal_id) {
                return (Some(ids), false);
            }
            ids.push(deal_id.to_string());
            (Some(ids), true)
        })
    }

    pub fn remove(&self, deal_id: &str) -> Result<bool, StorageError> {
        self.retain(|id| id != deal_id).map(|removed| removed > 0)
    }

    /// Flips the saved state and returns the new one.
    pub fn toggle(&self, deal_id: &str) -> Result<bool, StorageError> {
        if self.remove(deal_id)? {
            Ok(false)
        } else {
            self.add(deal_id)
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(GUEST_SAVES_KEY)?;
        Ok(())
    }

    /// Keeps the ids matching `keep`; an empty list drops the key. Returns
    /// how many ids were removed.
    fn retain(&self, keep: impl Fn(&str) -> bool) -> Result<usize, StorageError> {
        self.store.update(GUEST_SAVES_KEY, |ids: Option<Vec<String>>| {
            let mut ids = ids.unwrap_or_default();
            let before = ids.len();
            ids.retain(|id| keep(id));
            let removed = before - ids.len();
            ((!ids.is_empty()).then_some(ids), removed)
        })
    }

    /// Pushes every saved id to `remote` concurrently and drops the ones
    /// that synced. Ids saved while the sync was in flight are kept.
    pub async fn sync<R: SavedDeals + ?Sized>(&self, remote: &R) -> Result<SyncReport, StorageError> {
        let ids = self.ids()?;
        if ids.is_empty() {
            return Ok(SyncReport::default());
        }

        let results = join_all(ids.iter().map(|id| remote.save_deal(id))).await;
        let mut report = SyncReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.synced.push(id),
                Err(err) => {
                    warn!(deal = %id, error = %err, "guest save did not sync");
                    report.failed.push((id, err));
                }
            }
        }

        self.retain(|id| !report.synced.iter().any(|synced| synced == id))?;
        info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            "guest saves synced"
        );
        Ok(report)
    }
}
