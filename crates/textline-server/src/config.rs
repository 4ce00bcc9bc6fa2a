//! Server settings and the configuration provider.
//!
//! [`ServerConfig`] holds the process settings parsed at startup.
//! [`ConfigProvider`] resolves deployment settings by name and reports on
//! their completeness; handlers only consult it for the admin key, the log
//! secret, and the health/diagnostics reports.

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::Serialize;
use textline_auth::DEFAULT_WINDOW_MINUTES;
use textline_logs::{DeploymentContext, DEFAULT_CAPACITY};

/// Settings required by the message gateway.
pub const REQUIRED_VARS: [&str; 3] = ["TWILIO_ACCOUNT_SID", "TWILIO_AUTH_TOKEN", "TWILIO_PHONE_NUMBER"];

/// Admin key setting.
pub const ADMIN_KEY_VAR: &str = "ADMIN_KEY";

/// Token secret setting.
pub const LOG_SECRET_VAR: &str = "LOG_ACCESS_SECRET";

/// Process settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Ring buffer capacity of the log store.
    pub log_capacity: usize,
    /// Token validity window in minutes.
    pub token_window_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_capacity: DEFAULT_CAPACITY,
            token_window_minutes: DEFAULT_WINDOW_MINUTES,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Set the log store capacity.
    #[must_use]
    pub const fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Set the token validity window.
    #[must_use]
    pub const fn with_token_window_minutes(mut self, minutes: u32) -> Self {
        self.token_window_minutes = minutes;
        self
    }
}

/// Presence check over the required gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValidation {
    /// True when nothing is missing.
    pub is_valid: bool,
    /// Unset settings.
    pub missing: Vec<String>,
    /// Set settings.
    pub present: Vec<String>,
    /// Whether the message gateway can be used.
    pub twilio_configured: bool,
    /// One-line summary.
    pub summary: String,
}

/// Log access secrets. Serialises presence only.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogAccessConfig {
    /// Admin key, if configured.
    #[serde(serialize_with = "serialize_presence")]
    pub admin_key: Option<String>,
    /// Token secret, if configured.
    #[serde(serialize_with = "serialize_presence")]
    pub log_secret: Option<String>,
    /// True when both are configured.
    pub is_secure: bool,
}

impl std::fmt::Debug for LogAccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogAccessConfig")
            .field("admin_key", &self.admin_key.as_ref().map(|_| "[REDACTED]"))
            .field("log_secret", &self.log_secret.as_ref().map(|_| "[REDACTED]"))
            .field("is_secure", &self.is_secure)
            .finish()
    }
}

fn serialize_presence<S: serde::Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if value.is_some() { "SET" } else { "MISSING" })
}

/// Where the process is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    /// Deployment environment name.
    pub environment: String,
    /// True for `production`.
    pub is_production: bool,
    /// `serverless` inside a function runtime, otherwise `local`.
    pub platform: String,
    /// Cloud region or `unknown`.
    pub region: String,
    /// Function name or `local`.
    pub function_name: String,
}

impl EnvironmentInfo {
    /// The context stamped on every log entry.
    #[must_use]
    pub fn deployment_context(&self) -> DeploymentContext {
        DeploymentContext {
            environment: self.environment.clone(),
            function: self.function_name.clone(),
        }
    }
}

/// Overall configuration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigStatus {
    /// All required settings present.
    Configured,
    /// At least one required setting missing.
    ConfigurationError,
}

/// Full configuration report with remediation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    /// Overall status.
    pub status: ConfigStatus,
    /// Required-settings check.
    pub validation: ConfigValidation,
    /// Log access state.
    pub logging: LogAccessConfig,
    /// Runtime environment.
    pub environment: EnvironmentInfo,
    /// What to fix.
    pub recommendations: Vec<String>,
    /// How to fix it.
    pub next_steps: Vec<String>,
}

/// Resolves deployment settings by name.
pub trait ConfigProvider: Send + Sync + std::fmt::Debug {
    /// Returns the value of `key`, or `None` when unset or empty.
    fn resolve(&self, key: &str) -> Option<String>;

    /// Checks that the required gateway settings are present.
    fn validate(&self) -> ConfigValidation {
        let (present, missing): (Vec<&str>, Vec<&str>) =
            REQUIRED_VARS.into_iter().partition(|key| self.resolve(key).is_some());
        let is_valid = missing.is_empty();
        let summary = if is_valid {
            format!("All {} required variables configured", REQUIRED_VARS.len())
        } else {
            format!(
                "Missing {} required variables: {}",
                missing.len(),
                missing.join(", ")
            )
        };
        ConfigValidation {
            is_valid,
            missing: missing.into_iter().map(str::to_string).collect(),
            present: present.into_iter().map(str::to_string).collect(),
            twilio_configured: is_valid,
            summary,
        }
    }

    /// Returns the log access secrets.
    fn log_access(&self) -> LogAccessConfig {
        let admin_key = self.resolve(ADMIN_KEY_VAR);
        let log_secret = self.resolve(LOG_SECRET_VAR);
        let is_secure = admin_key.is_some() && log_secret.is_some();
        LogAccessConfig {
            admin_key,
            log_secret,
            is_secure,
        }
    }

    /// Describes the runtime environment.
    fn environment(&self) -> EnvironmentInfo {
        let environment = self
            .resolve("TEXTLINE_ENV")
            .or_else(|| self.resolve("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let function = self.resolve("AWS_LAMBDA_FUNCTION_NAME");
        EnvironmentInfo {
            is_production: environment == "production",
            environment,
            platform: if function.is_some() { "serverless" } else { "local" }.to_string(),
            region: self.resolve("AWS_REGION").unwrap_or_else(|| "unknown".to_string()),
            function_name: function.unwrap_or_else(|| "local".to_string()),
        }
    }

    /// Builds the full report.
    fn report(&self) -> ConfigReport {
        let validation = self.validate();
        let logging = self.log_access();
        let environment = self.environment();

        let mut recommendations = Vec::new();
        if !validation.is_valid {
            recommendations.push("Configure missing Twilio environment variables".to_string());
        }
        if !logging.is_secure {
            recommendations.push(format!(
                "Set {ADMIN_KEY_VAR} and {LOG_SECRET_VAR} for secure log access"
            ));
        }
        if !environment.is_production {
            recommendations.push("Set NODE_ENV=production for production deployment".to_string());
        }

        let mut next_steps: Vec<String> = validation
            .missing
            .iter()
            .map(|var| format!("Add {var}=<your {}>", var.to_lowercase()))
            .collect();
        if logging.admin_key.is_none() {
            next_steps.push(format!("Add {ADMIN_KEY_VAR}=<a long random string>"));
        }
        if logging.log_secret.is_none() {
            next_steps.push(format!("Add {LOG_SECRET_VAR}=<a long random string>"));
        }
        if !next_steps.is_empty() {
            next_steps.push("Restart the service after adding environment variables".to_string());
        }

        ConfigReport {
            status: if validation.is_valid {
                ConfigStatus::Configured
            } else {
                ConfigStatus::ConfigurationError
            },
            validation,
            logging,
            environment,
            recommendations,
            next_steps,
        }
    }
}

/// Reads settings from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigProvider for EnvConfig {
    fn resolve(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<String, String>,
}

impl StaticConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a setting.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigProvider for StaticConfig {
    fn resolve(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
