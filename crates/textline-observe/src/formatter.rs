//! Reshaping of log entries and diagnoses for automated agents.
//!
//! Agents get entries with the well-known payload keys lifted into named
//! sections, a condensed summary, and a block of standing guidance.

use serde::Serialize;
use serde_json::Value;
use textline_logs::{LogData, LogEntry, LogLevel};

use crate::analyzer::analyze;
use crate::types::{Diagnosis, ErrorPatterns};

/// Number of recent errors included in an [`AgentSummary`].
pub const RECENT_ERROR_LIMIT: usize = 5;

/// Payload keys lifted into named sections of an [`AgentLogEntry`].
const LIFTED_KEYS: [&str; 11] = [
    "error",
    "errorMessage",
    "stack",
    "method",
    "path",
    "query",
    "body",
    "twilioError",
    "missing",
    "validation",
    "twilioConfigured",
];

/// Error details lifted from a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetails {
    /// `errorMessage`, else `error`.
    pub message: Value,
    /// Stack trace if recorded.
    pub stack: Value,
    /// Error code if recorded.
    pub code: Value,
}

/// The HTTP request an entry describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDetails {
    /// HTTP method.
    pub method: Value,
    /// Request path.
    pub path: Value,
    /// Query parameters.
    pub query: Value,
    /// Request body.
    pub body: Value,
}

/// An error reported by the messaging provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderError {
    /// Provider error code.
    pub code: Value,
    /// Provider message.
    pub message: Value,
    /// Provider documentation link.
    pub more_info: Value,
}

/// Configuration state recorded with an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationDetails {
    /// Names of missing settings.
    pub missing_vars: Value,
    /// Validation outcome.
    pub validation: Value,
    /// Whether the provider was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured: Option<Value>,
}

/// A log entry reshaped for machine readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentLogEntry {
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
    /// Correlation id.
    pub request_id: Option<String>,
    /// Lifted error fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
    /// Lifted request fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestDetails>,
    /// Lifted provider error.
    #[serde(rename = "twilio_error", skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<ProviderError>,
    /// Lifted configuration fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ConfigurationDetails>,
    /// Everything else in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<LogData>,
}

/// Null, false, zero and the empty string count as absent.
fn present<'a>(data: &'a LogData, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn field(data: &LogData, key: &str) -> Value {
    present(data, key).cloned().unwrap_or(Value::Null)
}

/// Reshapes `entry` into an [`AgentLogEntry`].
#[must_use]
pub fn format_for_agent(entry: &LogEntry) -> AgentLogEntry {
    let data = &entry.data;

    let error_details = present(data, "errorMessage")
        .or_else(|| present(data, "error"))
        .map(|message| ErrorDetails {
            message: message.clone(),
            stack: field(data, "stack"),
            code: field(data, "code"),
        });

    let request = (present(data, "method").is_some() || present(data, "path").is_some()).then(|| {
        RequestDetails {
            method: data.get("method").cloned().unwrap_or(Value::Null),
            path: data.get("path").cloned().unwrap_or(Value::Null),
            query: field(data, "query"),
            body: field(data, "body"),
        }
    });

    let provider_error = present(data, "twilioError").map(|err| ProviderError {
        code: err.get("code").cloned().unwrap_or(Value::Null),
        message: err.get("message").cloned().unwrap_or(Value::Null),
        more_info: err.get("moreInfo").cloned().unwrap_or(Value::Null),
    });

    let configuration = (present(data, "missing").is_some() || present(data, "validation").is_some())
        .then(|| ConfigurationDetails {
            missing_vars: field(data, "missing"),
            validation: field(data, "validation"),
            configured: data.get("twilioConfigured").cloned(),
        });

    let additional: LogData = data
        .iter()
        .filter(|(k, _)| !LIFTED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    AgentLogEntry {
        timestamp: entry.timestamp_iso(),
        level: entry.level,
        message: entry.message.clone(),
        request_id: entry.request_id.clone(),
        error_details,
        request,
        provider_error,
        configuration,
        additional_data: (!additional.is_empty()).then_some(additional),
    }
}

/// Overall state reported in an [`AgentSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStatus {
    /// At least one error.
    IssuesFound,
    /// No errors.
    Healthy,
}

/// A recent error as shown in an [`AgentSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentError {
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Message text.
    pub message: String,
    /// Payload.
    pub data: LogData,
    /// Correlation id.
    pub request_id: Option<String>,
}

/// Condensed view of a result set for agents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    /// Whether any errors were found.
    pub status: SummaryStatus,
    /// One-line summary.
    pub summary: String,
    /// Number of ERROR entries.
    pub error_count: usize,
    /// Number of WARN entries.
    pub warn_count: usize,
    /// Number of entries summarised.
    pub total_logs: usize,
    /// Newest errors first.
    pub recent_errors: Vec<RecentError>,
    /// Category counts.
    pub common_issues: ErrorPatterns,
    /// Guidance from the diagnosis.
    pub recommendations: Vec<String>,
}

/// Summarises `entries`, which were fetched with the given `limit`.
#[must_use]
pub fn summarize(entries: &[LogEntry], limit: usize) -> AgentSummary {
    let diagnosis = analyze(entries);

    let recent_errors = entries
        .iter()
        .filter(|e| e.level == LogLevel::Error)
        .take(RECENT_ERROR_LIMIT)
        .map(|e| RecentError {
            timestamp: e.timestamp_iso(),
            message: e.message.clone(),
            data: e.data.clone(),
            request_id: e.request_id.clone(),
        })
        .collect();

    AgentSummary {
        status: if diagnosis.has_errors() {
            SummaryStatus::IssuesFound
        } else {
            SummaryStatus::Healthy
        },
        summary: format!(
            "Found {} errors, {} warnings in last {limit} entries",
            diagnosis.error_count, diagnosis.warn_count
        ),
        error_count: diagnosis.error_count,
        warn_count: diagnosis.warn_count,
        total_logs: entries.len(),
        recent_errors,
        common_issues: diagnosis.patterns,
        recommendations: diagnosis.recommendations,
    }
}

/// Standing guidance shipped alongside agent-facing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentInstructions {
    /// What the entries are.
    pub description: &'static str,
    /// Problems seen often enough to check first.
    pub common_issues: [&'static str; 4],
    /// Recommendations from the diagnosis.
    pub fix_suggestions: Vec<String>,
    /// Next steps from the diagnosis.
    pub next_steps: Vec<String>,
}

impl AgentInstructions {
    /// Builds instructions carrying the guidance of `diagnosis`.
    #[must_use]
    pub fn from_diagnosis(diagnosis: &Diagnosis) -> Self {
        Self {
            description: "These are application logs from the Textline SMS messaging service",
            common_issues: [
                "Missing Twilio environment variables (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_PHONE_NUMBER)",
                "Invalid phone number format (must include country code)",
                "Missing required fields in SMS requests (to, message)",
                "Configuration errors requiring environment variable setup in the deployment",
            ],
            fix_suggestions: diagnosis.recommendations.clone(),
            next_steps: diagnosis.next_steps.clone(),
        }
    }
}
