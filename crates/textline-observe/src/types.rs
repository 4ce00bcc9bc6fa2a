//! Core types for log analysis.
//!
//! This module defines the health status, the error categories the analyzer
//! recognises, and the [`Diagnosis`] it produces.

use serde::{Deserialize, Serialize};

/// Overall health derived from a set of log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// No errors in the analysed entries.
    #[default]
    Healthy,
    /// At least one error points at missing or broken configuration.
    ConfigurationError,
    /// Errors present, none of them configuration related.
    ErrorsDetected,
}

impl HealthStatus {
    /// Returns true if the status requires attention.
    #[must_use]
    pub const fn requires_attention(&self) -> bool {
        !matches!(self, Self::Healthy)
    }

    /// Returns the wire form of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::ErrorsDetected => "ERRORS_DETECTED",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error categories recognised by keyword.
///
/// The declaration order is the scan order, which fixes the order of
/// issues, recommendations and next steps in a [`Diagnosis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Missing or broken environment configuration.
    Configuration,
    /// Requests lacking required fields.
    MissingFields,
    /// Failures reported by the messaging provider.
    TwilioApi,
    /// Rejected input.
    Validation,
    /// Failed authentication or authorization.
    Authentication,
}

impl Category {
    /// All categories in scan order.
    pub const ALL: [Self; 5] = [
        Self::Configuration,
        Self::MissingFields,
        Self::TwilioApi,
        Self::Validation,
        Self::Authentication,
    ];

    /// Lower-case substrings that place an error in this category.
    #[must_use]
    pub const fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Configuration => &["configuration", "environment"],
            Self::MissingFields => &["missing required", "missing field"],
            Self::TwilioApi => &["twilio"],
            Self::Validation => &["validation", "invalid"],
            Self::Authentication => &["unauthorized", "authentication"],
        }
    }

    /// Whether the serialised payload is scanned as well as the message.
    #[must_use]
    pub const fn scans_data(&self) -> bool {
        matches!(self, Self::TwilioApi)
    }

    /// Returns true if the lower-cased message or payload names this category.
    #[must_use]
    pub fn matches(&self, message: &str, data: &str) -> bool {
        self.keywords()
            .iter()
            .any(|k| message.contains(k) || (self.scans_data() && data.contains(k)))
    }

    /// Human-readable issue description.
    #[must_use]
    pub const fn issue(&self) -> &'static str {
        match self {
            Self::Configuration => "Missing or invalid Twilio configuration",
            Self::MissingFields => "Required fields missing in API requests",
            Self::TwilioApi => "Twilio API errors or authentication issues",
            Self::Validation => "Input validation failures",
            Self::Authentication => "Authentication or authorization failures",
        }
    }

    /// What to fix.
    #[must_use]
    pub const fn recommendation(&self) -> &'static str {
        match self {
            Self::Configuration => "Configure Twilio environment variables in the deployment environment",
            Self::MissingFields => "Ensure all API requests include required fields (to, message for SMS)",
            Self::TwilioApi => "Verify Twilio account status and credentials",
            Self::Validation => "Review input validation rules for phone numbers and message content",
            Self::Authentication => "Check admin key and authentication tokens",
        }
    }

    /// How to fix it.
    #[must_use]
    pub const fn next_step(&self) -> &'static str {
        match self {
            Self::Configuration => {
                "Set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER in the deployment environment and restart the service"
            }
            Self::MissingFields => {
                "Update client-side validation to check for required fields before sending requests"
            }
            Self::TwilioApi => {
                "Check Twilio console for account balance and verify phone number is active"
            }
            Self::Validation => "Ensure phone numbers include country code (e.g., +1 for US)",
            Self::Authentication => "Verify ADMIN_KEY environment variable is set correctly",
        }
    }
}

/// Per-category error counts.
///
/// An error can match several categories, so the named counts may sum to more
/// than the number of errors and `other` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPatterns {
    /// Configuration errors.
    pub configuration: usize,
    /// Missing-field errors.
    pub missing_fields: usize,
    /// Provider API errors.
    pub twilio_api: usize,
    /// Validation errors.
    pub validation: usize,
    /// Authentication errors.
    pub authentication: usize,
    /// Errors minus the sum of the named categories.
    pub other: i64,
}

impl ErrorPatterns {
    /// Returns the count for a named category.
    #[must_use]
    pub const fn get(&self, category: Category) -> usize {
        match category {
            Category::Configuration => self.configuration,
            Category::MissingFields => self.missing_fields,
            Category::TwilioApi => self.twilio_api,
            Category::Validation => self.validation,
            Category::Authentication => self.authentication,
        }
    }

    pub(crate) fn increment(&mut self, category: Category) {
        let slot = match category {
            Category::Configuration => &mut self.configuration,
            Category::MissingFields => &mut self.missing_fields,
            Category::TwilioApi => &mut self.twilio_api,
            Category::Validation => &mut self.validation,
            Category::Authentication => &mut self.authentication,
        };
        *slot += 1;
    }

    /// Sum of the five named categories.
    #[must_use]
    pub fn categorised(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Structured result of analysing a set of log entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// One-line summary.
    pub summary: String,
    /// Number of ERROR entries.
    pub error_count: usize,
    /// Number of WARN entries.
    pub warn_count: usize,
    /// Category counts.
    pub patterns: ErrorPatterns,
    /// Distinct issues in first-seen order.
    pub specific_issues: Vec<String>,
    /// Actionable guidance.
    pub recommendations: Vec<String>,
    /// Concrete steps, paired with the category recommendations.
    pub next_steps: Vec<String>,
    /// Overall health.
    pub health_status: HealthStatus,
}

impl Diagnosis {
    /// Returns true if any errors were found.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}
