//! # textline-logs
//!
//! In-process log telemetry for Textline.
//!
//! This crate provides:
//!
//! - [`LogEntry`] - Immutable structured log entries
//! - [`LogLevel`] - Severity levels (Error, Warn, Info, Debug)
//! - [`LogStore`] - Bounded ring buffer with FIFO eviction
//! - [`LogSink`] - Side channel mirroring appended entries
//! - [`LogQuery`] - Level, search, correlation and time-window filtering
//! - [`render_text`] / [`render_html`] - Response renderers
//!
//! ## Example
//!
//! ```rust
//! use textline_logs::{LogData, LogLevel, LogQuery, LogStore};
//!
//! let store = LogStore::new(1000);
//! store.error("Twilio error 21211", LogData::new(), Some("req-1"));
//! store.info("SMS sent", LogData::new(), Some("req-2"));
//!
//! let result = LogQuery::new()
//!     .with_level(LogLevel::Error)
//!     .with_search("twilio")
//!     .execute(&store);
//! assert_eq!(result.entries.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod query;
pub mod render;
pub mod sink;
pub mod store;
pub mod types;

pub use error::{LogError, Result};
pub use query::{parse_hours, parse_limit, LevelCounts, LogQuery, QueryResult, QueryStats, TimeSpan};
pub use render::{escape_html, format_line, render_html, render_text, OutputFormat};
pub use sink::{LogSink, NoopSink, TracingSink};
pub use store::{shared_store, LogStore, LogStoreConfig, SharedLogStore, DEFAULT_CAPACITY};
pub use types::{iso_millis, DeploymentContext, LevelFilter, LogData, LogEntry, LogId, LogLevel};
