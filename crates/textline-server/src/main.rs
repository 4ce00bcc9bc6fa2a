//! textline - log-access server for the Textline SMS backend.

use std::sync::Arc;

use clap::Parser;
use textline_logs::TracingSink;
use textline_server::{ConfigProvider, EnvConfig, ServerArgs, TextlineServer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let provider = Arc::new(EnvConfig);
    let report = provider.report();
    if !report.logging.is_secure {
        warn!("ADMIN_KEY or LOG_ACCESS_SECRET is not set; protected endpoints will reject every request");
    }
    if !report.validation.is_valid {
        warn!(missing = ?report.validation.missing, "gateway configuration incomplete");
    }

    let config = args.server_config();
    let addr = config.bind_addr;
    info!(
        environment = %report.environment.environment,
        platform = %report.environment.platform,
        "starting textline"
    );

    let server = TextlineServer::new(config, provider, Arc::new(TracingSink));
    server
        .serve_with_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    Ok(())
}
