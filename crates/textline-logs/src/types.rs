//! Core types for the log store.
//!
//! This module provides:
//! - [`LogLevel`] - The four severity levels
//! - [`LevelFilter`] - A level restriction, or none
//! - [`LogEntry`] - An immutable structured record
//! - [`LogId`] - Unique identifier for log entries
//! - [`DeploymentContext`] - Environment tags stamped on every entry

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LogError;

/// Structured payload attached to an entry.
pub type LogData = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub Uuid);

impl LogId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning conditions
    Warn,
    /// Error conditions
    Error,
}

impl LogLevel {
    /// All levels, most severe first.
    pub const ALL: [Self; 4] = [Self::Error, Self::Warn, Self::Info, Self::Debug];

    /// Returns the upper-case name of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" => Ok(Self::Warn),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(LogError::UnknownLevel(s.to_string())),
        }
    }
}

/// Restricts a query to one level, or lets every level through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    /// No level filtering.
    #[default]
    All,
    /// Exact match on one level.
    Only(LogLevel),
}

impl LevelFilter {
    /// Parses a user-supplied level permissively.
    ///
    /// Absent, empty, `ALL` and unrecognised values all mean no filtering.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse::<LogLevel>().ok())
            .map_or(Self::All, Self::Only)
    }

    /// Returns true if an entry at `level` passes this filter.
    #[must_use]
    pub fn admits(&self, level: LogLevel) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == level,
        }
    }

    /// Returns the filter name as shown in query metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Only(level) => level.as_str(),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        Self::Only(level)
    }
}

/// Deployment tags resolved from process context when the store is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    /// Deployment environment, e.g. `production`.
    pub environment: String,
    /// Function or process name that produced the entry.
    pub function: String,
}

impl Default for DeploymentContext {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            function: "local".to_string(),
        }
    }
}

/// A structured log entry. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique identifier for this entry
    pub id: LogId,
    /// When the entry was created
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Severity level
    pub level: LogLevel,
    /// The log message
    pub message: String,
    /// Additional structured payload
    #[serde(default)]
    pub data: LogData,
    /// Correlation id shared by every entry of one logical request
    pub request_id: Option<String>,
    /// Deployment environment
    pub environment: String,
    /// Producing function
    pub function: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current time and a fresh id.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let context = DeploymentContext::default();
        Self {
            id: LogId::new(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: LogData::new(),
            request_id: None,
            environment: context.environment,
            function: context.function,
        }
    }

    /// Replaces the payload.
    #[must_use]
    pub fn with_data(mut self, data: LogData) -> Self {
        self.data = data;
        self
    }

    /// Adds a single payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Overrides the creation time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Stamps the deployment tags.
    #[must_use]
    pub fn with_context(mut self, context: &DeploymentContext) -> Self {
        self.environment.clone_from(&context.environment);
        self.function.clone_from(&context.function);
        self
    }

    /// Returns true if the payload has at least one key.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Serializes the payload to compact JSON (`{}` when empty).
    #[must_use]
    pub fn data_json(&self) -> String {
        serde_json::to_string(&self.data).unwrap_or_else(|_| "{}".to_string())
    }

    /// Returns the timestamp in millisecond ISO-8601 form.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        iso_millis::format(&self.timestamp)
    }

    /// Case-insensitive match of `needle` against the message or serialized payload.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
            || self.data_json().to_lowercase().contains(needle)
    }
}

/// Serde helpers writing timestamps as `2025-01-01T00:00:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Formats a timestamp with millisecond precision and a `Z` suffix.
    #[must_use]
    pub fn format(timestamp: &DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Serializes a timestamp.
    pub fn serialize<S: Serializer>(timestamp: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(timestamp))
    }

    /// Deserializes any RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
