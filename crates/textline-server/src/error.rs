//! Error types for the log-access endpoints.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for handler operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for server lifecycle operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listener.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, #[source] std::io::Error),

    /// The accept loop failed.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Errors returned to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token or timestamp supplied.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Token expired, malformed or forged.
    #[error("Invalid authentication")]
    InvalidAuthentication,

    /// Missing or wrong admin key.
    #[error("Unauthorized - valid admin_key required")]
    InvalidAdminKey,

    /// Verb other than GET or OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Unexpected failure while serving the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired | Self::InvalidAdminKey => StatusCode::UNAUTHORIZED,
            Self::InvalidAuthentication => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for server-side failures.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    const fn help(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationRequired => Some("Include token and timestamp parameters"),
            Self::InvalidAdminKey => Some("Include admin_key parameter with valid key"),
            _ => None,
        }
    }

    /// Builds the response, tagged with the request's correlation id.
    pub fn into_response_with_id(self, request_id: &str) -> Response {
        self.render(Some(request_id))
    }

    fn render(self, request_id: Option<&str>) -> Response {
        let error = if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            error,
            help: self.help(),
            request_id,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

impl From<textline_auth::Error> for ApiError {
    fn from(err: textline_auth::Error) -> Self {
        use textline_auth::Error as AuthError;
        match err {
            AuthError::AuthenticationRequired => Self::AuthenticationRequired,
            AuthError::InvalidAuthentication { .. } => Self::InvalidAuthentication,
            AuthError::InvalidAdminKey | AuthError::AdminKeyNotConfigured => Self::InvalidAdminKey,
            AuthError::SecretNotConfigured | AuthError::CryptoError { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
