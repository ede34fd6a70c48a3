//! Top-level client wiring config, session, gateway, storage and toasts.

use std::sync::Arc;

use tracing::{info, warn};
use zendulge_config::{Config, ConfigManager};
use zendulge_domain::{Credentials, User};

use crate::api::{ApiClient, GatewayError, Session};
use crate::errors::Result;
use crate::guest_saves::GuestSaves;
use crate::listing::{load_dashboard, Dashboard, ListQuery, MountToken};
use crate::notify::{Notification, NotificationSink};
use crate::storage::LocalStore;

pub struct ZendulgeClient {
    config: Config,
    api: ApiClient,
    guest_saves: GuestSaves,
    sink: Arc<dyn NotificationSink>,
}

impl ZendulgeClient {
    pub fn new(config: Config, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(&config, Session::new())?;
        let store = LocalStore::open(&config.resolve_storage_dir())?;
        info!(api = %api.base_url(), "client ready");
        Ok(Self {
            config,
            api,
            guest_saves: GuestSaves::new(Arc::new(store)),
            sink,
        })
    }

    /// Loads the saved config (plus environment overrides) and builds a client.
    pub fn from_manager(manager: &ConfigManager, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        Self::new(manager.load_effective()?, sink)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    pub fn guest_saves(&self) -> &GuestSaves {
        &self.guest_saves
    }

    pub fn sink(&self) -> &dyn NotificationSink {
        self.sink.as_ref()
    }

    /// Empty query sized to the configured page length.
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.config.page_size)
    }

    /// Logs in, then pushes any guest saves to the account. A failed sync
    /// never fails the login.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        let user = match self.api.login(credentials).await {
            Ok(user) => user,
            Err(err) => {
                let title = match err {
                    GatewayError::Unauthorized => "Invalid email or password",
                    _ => "Failed to sign in",
                };
                self.sink.notify(Notification::failure(title));
                return Err(err.into());
            }
        };

        match self.guest_saves.sync(&self.api).await {
            Ok(report) if !report.synced.is_empty() => {
                self.sink.notify(
                    Notification::success("Saved deals synced").with_description(format!(
                        "{} deal(s) added to your account",
                        report.synced.len()
                    )),
                );
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not read guest saves"),
        }

        self.sink
            .notify(Notification::success(format!("Welcome back, {}", user.first_name)));
        Ok(user)
    }

    pub fn sign_out(&self) {
        self.api.logout();
        self.sink.notify(Notification::success("Signed out"));
    }

    /// Dashboard for the selected business, or `None` when nothing is
    /// selected or the view unmounted first.
    pub async fn dashboard(&self, token: &MountToken) -> Option<Dashboard> {
        let business_id = self.session().business_id()?;
        let dashboard = load_dashboard(&self.api, &business_id, token).await?;
        dashboard.report_failures(self.sink.as_ref());
        Some(dashboard)
    }
}
