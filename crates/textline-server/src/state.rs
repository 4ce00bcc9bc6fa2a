//! Shared state for the log-access server.

use std::sync::Arc;
use std::time::Instant;

use textline_auth::TokenService;
use textline_logs::{LogData, SharedLogStore};

use crate::config::{ConfigProvider, ServerConfig};
use crate::error::ApiError;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// Process-wide log store.
    store: SharedLogStore,
    /// Deployment settings.
    provider: Arc<dyn ConfigProvider>,
    /// Server settings.
    config: ServerConfig,
    /// Server start time.
    start_time: Instant,
}

impl AppState {
    /// Create a new state.
    pub fn new(store: SharedLogStore, provider: Arc<dyn ConfigProvider>, config: ServerConfig) -> Self {
        Self {
            store,
            provider,
            config,
            start_time: Instant::now(),
        }
    }

    /// Get the log store.
    #[must_use]
    pub fn store(&self) -> &SharedLogStore {
        &self.store
    }

    /// Get the configuration provider.
    #[must_use]
    pub fn provider(&self) -> &dyn ConfigProvider {
        self.provider.as_ref()
    }

    /// Get the server settings.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Seconds since the state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// The configured admin key, if any.
    #[must_use]
    pub fn admin_key(&self) -> Option<String> {
        self.provider.log_access().admin_key
    }

    /// A token service keyed with the configured secret, if any.
    #[must_use]
    pub fn token_service(&self) -> Option<TokenService> {
        self.provider
            .log_access()
            .log_secret
            .map(|secret| TokenService::new(secret).with_window_minutes(self.config.token_window_minutes))
    }

    /// Records a failed request in the store and builds its response.
    ///
    /// Internal errors are logged at ERROR with their message; client errors
    /// were already recorded where they were detected.
    pub fn fail(&self, err: ApiError, request_id: &str, context: &str) -> axum::response::Response {
        if let ApiError::Internal(ref message) = err {
            let mut data = LogData::new();
            data.insert("errorMessage".to_string(), message.clone().into());
            self.store.error(context, data, Some(request_id));
        }
        err.into_response_with_id(request_id)
    }
}
