//! Log-access server lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use textline_logs::{shared_store, LogSink, LogStoreConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{ConfigProvider, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::routes::create_router;
use crate::state::AppState;

/// HTTP server exposing the log store.
#[derive(Debug, Clone)]
pub struct TextlineServer {
    state: Arc<AppState>,
}

impl TextlineServer {
    /// Creates a server with a fresh log store.
    ///
    /// Entries are stamped with the deployment context reported by
    /// `provider` and mirrored to `sink`.
    #[must_use]
    pub fn new(config: ServerConfig, provider: Arc<dyn ConfigProvider>, sink: Arc<dyn LogSink>) -> Self {
        let store_config = LogStoreConfig::default()
            .with_capacity(config.log_capacity)
            .with_context(provider.environment().deployment_context());
        let store = shared_store(store_config, sink);
        Self {
            state: Arc::new(AppState::new(store, provider, config)),
        }
    }

    /// Get the server state for external access.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Serves on the configured address until a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the accept loop stops.
    pub async fn serve(&self) -> ServerResult<()> {
        self.serve_with_shutdown(self.state.config().bind_addr, std::future::pending())
            .await
    }

    /// Serves on `addr` until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the accept loop stops.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;
        let local = listener.local_addr().unwrap_or(addr);

        info!(
            addr = %local,
            capacity = self.state.store().capacity(),
            "log access server listening"
        );

        axum::serve(listener, create_router(self.state()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        info!("log access server stopped");
        Ok(())
    }
}
