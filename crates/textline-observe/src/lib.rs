//! # textline-observe
//!
//! Log analysis for Textline.
//!
//! This crate turns a set of log entries into a [`Diagnosis`]: counts per
//! error category, the distinct issues found, and remediation guidance. It
//! also reshapes entries and results for automated agents.
//!
//! ## Quick Start
//!
//! ```rust
//! use textline_logs::{LogEntry, LogLevel};
//! use textline_observe::{analyze, HealthStatus};
//!
//! let entries = vec![
//!     LogEntry::new(LogLevel::Error, "Missing required fields: to"),
//!     LogEntry::new(LogLevel::Error, "Twilio error 21211"),
//! ];
//!
//! let diagnosis = analyze(&entries);
//! assert_eq!(diagnosis.patterns.missing_fields, 1);
//! assert_eq!(diagnosis.patterns.twilio_api, 1);
//! assert_eq!(diagnosis.health_status, HealthStatus::ErrorsDetected);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod formatter;
pub mod types;

pub use analyzer::analyze;
pub use formatter::{
    format_for_agent, summarize, AgentInstructions, AgentLogEntry, AgentSummary,
    ConfigurationDetails, ErrorDetails, ProviderError, RecentError, RequestDetails,
    SummaryStatus, RECENT_ERROR_LIMIT,
};
pub use types::{Category, Diagnosis, ErrorPatterns, HealthStatus};
