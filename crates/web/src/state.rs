//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::AccountStore;
use crate::services::AccountService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the account service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    accounts: AccountService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Web configuration
    /// * `store` - Account store handle (`PostgreSQL` in production)
    #[must_use]
    pub fn new(config: WebConfig, store: Arc<dyn AccountStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                accounts: AccountService::new(store),
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the account service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }
}
