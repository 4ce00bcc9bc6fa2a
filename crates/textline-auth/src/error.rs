//! Error types for log-access authentication.

use thiserror::Error;

/// Errors that can occur while authenticating a log-access request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Token or timestamp missing from the request.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Token expired, malformed, or not derived from the shared secret.
    #[error("invalid authentication: {reason}")]
    InvalidAuthentication {
        /// Why the token was rejected.
        reason: &'static str,
    },

    /// Admin key missing or wrong.
    #[error("invalid admin key")]
    InvalidAdminKey,

    /// The server has no admin key configured, so none can match.
    #[error("admin key not configured")]
    AdminKeyNotConfigured,

    /// The server has no token secret configured.
    #[error("log access secret not configured")]
    SecretNotConfigured,

    /// Crypto error.
    #[error("crypto error: {reason}")]
    CryptoError {
        /// The reason the crypto operation failed.
        reason: String,
    },
}

impl Error {
    /// Returns true for failures caused by the caller's credentials rather
    /// than by server configuration.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationRequired | Self::InvalidAuthentication { .. } | Self::InvalidAdminKey
        )
    }
}

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
