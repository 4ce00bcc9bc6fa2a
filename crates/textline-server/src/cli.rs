//! Command-line argument parsing with clap.

use std::net::SocketAddr;

use clap::Parser;
use textline_auth::DEFAULT_WINDOW_MINUTES;
use textline_logs::DEFAULT_CAPACITY;

use crate::config::ServerConfig;

/// Textline log-access server.
#[derive(Parser, Debug, Clone)]
#[command(name = "textline")]
#[command(version, about, long_about = None)]
pub struct ServerArgs {
    /// Address to listen on.
    #[arg(short, long, env = "TEXTLINE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Entries kept in the in-memory log store.
    #[arg(long, env = "TEXTLINE_LOG_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub log_capacity: usize,

    /// Validity window of issued log tokens, in minutes.
    #[arg(long, env = "TEXTLINE_TOKEN_WINDOW_MINUTES", default_value_t = DEFAULT_WINDOW_MINUTES)]
    pub token_window_minutes: u32,

    /// Emit structured JSON logs.
    #[arg(long, env = "TEXTLINE_JSON_LOGS")]
    pub json_logs: bool,
}

impl ServerArgs {
    /// Server settings described by these arguments.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.bind)
            .with_log_capacity(self.log_capacity)
            .with_token_window_minutes(self.token_window_minutes)
    }
}
