//! # textline-server
//!
//! HTTP boundary for the Textline log store.
//!
//! Exposes the in-memory log store to operators and automated agents over a
//! small axum API. Every response carries permissive CORS headers and every
//! endpoint answers `OPTIONS` with an empty 200.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textline_logs::TracingSink;
//! use textline_server::{EnvConfig, ServerConfig, TextlineServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = TextlineServer::new(
//!         ServerConfig::default(),
//!         Arc::new(EnvConfig),
//!         Arc::new(TracingSink),
//!     );
//!     // server.serve().await.unwrap();
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Auth | Description |
//! |----------|------|-------------|
//! | `/logs` | token + timestamp | Filtered entries as JSON, text or HTML |
//! | `/log-token` | `admin_key` | Issue a time-boxed access token |
//! | `/agent-logs` | `admin_key` | Entries or a summary, ERROR by default |
//! | `/application-logs` | none | Entries with a diagnosis and fix guidance |
//! | `/health` | none | Configuration-derived health |
//! | `/diagnostics` | none | Configuration report without secret values |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use cli::ServerArgs;
pub use config::{ConfigProvider, ConfigReport, EnvConfig, ServerConfig, StaticConfig};
pub use error::{ApiError, ApiResult, ServerError, ServerResult};
pub use routes::create_router;
pub use server::TextlineServer;
pub use state::AppState;
