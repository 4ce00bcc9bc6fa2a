//! Side channels that mirror appended entries for live debugging.
//!
//! The store is authoritative; a sink only observes. Dropping every mirrored
//! entry must never change what queries return.

use tracing::{debug, error, info, warn};

use crate::types::{LogEntry, LogLevel};

/// Receives a copy of every entry the store accepts.
pub trait LogSink: Send + Sync {
    /// Called once per appended entry, after it is stored.
    fn emit(&self, entry: &LogEntry);
}

/// Discards everything. Default for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn emit(&self, _entry: &LogEntry) {}
}

/// Forwards entries to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        let request_id = entry.request_id.as_deref().unwrap_or("-");
        let data = entry.data_json();
        match entry.level {
            LogLevel::Error => error!(target: "textline::store", request_id, %data, "{}", entry.message),
            LogLevel::Warn => warn!(target: "textline::store", request_id, %data, "{}", entry.message),
            LogLevel::Info => info!(target: "textline::store", request_id, %data, "{}", entry.message),
            LogLevel::Debug => debug!(target: "textline::store", request_id, %data, "{}", entry.message),
        }
    }
}

impl<F> LogSink for F
where
    F: Fn(&LogEntry) + Send + Sync,
{
    fn emit(&self, entry: &LogEntry) {
        self(entry);
    }
}
