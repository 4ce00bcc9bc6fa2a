//! Bounded in-memory log storage.
//!
//! This module provides:
//! - [`LogStore`] - Thread-safe ring buffer with FIFO eviction
//! - [`LogStoreConfig`] - Capacity and deployment tags
//! - [`SharedLogStore`] - `Arc` handle passed to request handlers

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::sink::{LogSink, NoopSink};
use crate::types::{DeploymentContext, LevelFilter, LogData, LogEntry, LogLevel};

/// Default number of entries kept before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Configuration for the log store.
#[derive(Debug, Clone)]
pub struct LogStoreConfig {
    /// Maximum number of log entries to keep.
    pub capacity: usize,
    /// Tags stamped on every entry.
    pub context: DeploymentContext,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            context: DeploymentContext::default(),
        }
    }
}

impl LogStoreConfig {
    /// Sets the capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the deployment tags.
    #[must_use]
    pub fn with_context(mut self, context: DeploymentContext) -> Self {
        self.context = context;
        self
    }
}

/// Thread-safe, append-only log store with FIFO eviction.
///
/// Entries live only as long as the process. Each instance is independent,
/// so tests and embedders can hold as many as they need.
pub struct LogStore {
    config: LogStoreConfig,
    /// Oldest at the front, newest at the back
    entries: RwLock<VecDeque<LogEntry>>,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::with_config(LogStoreConfig::default())
    }
}

impl LogStore {
    /// Creates a store with the given capacity, default tags and no mirroring.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(LogStoreConfig::default().with_capacity(capacity))
    }

    /// Creates a store from full configuration, with no mirroring.
    #[must_use]
    pub fn with_config(config: LogStoreConfig) -> Self {
        Self::with_sink(config, Arc::new(NoopSink))
    }

    /// Creates a store that mirrors every appended entry to `sink`.
    #[must_use]
    pub fn with_sink(config: LogStoreConfig, sink: Arc<dyn LogSink>) -> Self {
        let capacity = config.capacity;
        Self {
            config,
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            sink,
        }
    }

    /// Records a new entry and returns the stored copy.
    ///
    /// The oldest entries are evicted once the store holds more than its
    /// capacity. The sink sees the entry after the write lock is released.
    pub fn append(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        data: LogData,
        request_id: Option<&str>,
    ) -> LogEntry {
        let mut entry = LogEntry::new(level, message)
            .with_data(data)
            .with_context(&self.config.context);
        entry.request_id = request_id.map(str::to_string);
        self.push(entry.clone());
        self.sink.emit(&entry);
        entry
    }

    /// Inserts a pre-built entry, keeping its id and timestamp.
    ///
    /// Used when replaying entries; producers should call [`LogStore::append`].
    pub fn insert(&self, entry: LogEntry) {
        self.push(entry.clone());
        self.sink.emit(&entry);
    }

    fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.write();
        entries.push_back(entry);
        while entries.len() > self.config.capacity {
            entries.pop_front();
        }
    }

    /// Records an ERROR entry.
    pub fn error(&self, message: impl Into<String>, data: LogData, request_id: Option<&str>) -> LogEntry {
        self.append(LogLevel::Error, message, data, request_id)
    }

    /// Records a WARN entry.
    pub fn warn(&self, message: impl Into<String>, data: LogData, request_id: Option<&str>) -> LogEntry {
        self.append(LogLevel::Warn, message, data, request_id)
    }

    /// Records an INFO entry.
    pub fn info(&self, message: impl Into<String>, data: LogData, request_id: Option<&str>) -> LogEntry {
        self.append(LogLevel::Info, message, data, request_id)
    }

    /// Records a DEBUG entry.
    pub fn debug(&self, message: impl Into<String>, data: LogData, request_id: Option<&str>) -> LogEntry {
        self.append(LogLevel::Debug, message, data, request_id)
    }

    /// Returns at most `limit` of the most recent entries passing `level`, newest first.
    #[must_use]
    pub fn query(&self, level: LevelFilter, limit: usize) -> Vec<LogEntry> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter(|e| level.admits(e.level))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns every entry carrying `request_id`, in store order.
    #[must_use]
    pub fn query_by_correlation(&self, request_id: &str) -> Vec<LogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.request_id.as_deref() == Some(request_id))
            .cloned()
            .collect()
    }

    /// Returns a copy of every entry, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().iter().rev().cloned().collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &LogStoreConfig {
        &self.config
    }
}

/// Shared log store handle.
pub type SharedLogStore = Arc<LogStore>;

/// Creates a new shared log store mirroring to `sink`.
#[must_use]
pub fn shared_store(config: LogStoreConfig, sink: Arc<dyn LogSink>) -> SharedLogStore {
    Arc::new(LogStore::with_sink(config, sink))
}
