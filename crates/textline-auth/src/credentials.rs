//! Extraction of log-access credentials from a request.
//!
//! Query parameters take precedence. When the query lacks a value, the token
//! falls back to `Authorization: Bearer <token>` and the timestamp to the
//! `X-Timestamp` header. Blank values count as absent.

use crate::error::{Error, Result};

/// The standard HTTP Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Header carrying the token timestamp when not passed in the query.
pub const X_TIMESTAMP_HEADER: &str = "x-timestamp";

/// A token and the timestamp it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCredentials<'a> {
    /// Hex token.
    pub token: &'a str,
    /// Unix milliseconds as presented by the client.
    pub timestamp: &'a str,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn bearer(authorization: Option<&str>) -> Option<&str> {
    non_blank(authorization.and_then(|auth| auth.trim().strip_prefix("Bearer ")))
}

/// Extracts token credentials from query values and headers.
///
/// # Errors
///
/// Returns [`Error::AuthenticationRequired`] if either the token or the
/// timestamp cannot be found.
pub fn extract_token_credentials<'a>(
    query_token: Option<&'a str>,
    query_timestamp: Option<&'a str>,
    authorization: Option<&'a str>,
    x_timestamp: Option<&'a str>,
) -> Result<TokenCredentials<'a>> {
    let token = non_blank(query_token).or_else(|| bearer(authorization));
    let timestamp = non_blank(query_timestamp).or_else(|| non_blank(x_timestamp));

    match (token, timestamp) {
        (Some(token), Some(timestamp)) => Ok(TokenCredentials { token, timestamp }),
        _ => Err(Error::AuthenticationRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_used() {
        let creds = extract_token_credentials(Some("abc"), Some("123"), None, None).expect("creds");
        assert_eq!(creds.token, "abc");
        assert_eq!(creds.timestamp, "123");
    }

    #[test]
    fn headers_used_as_fallback() {
        let creds =
            extract_token_credentials(None, None, Some("Bearer abc"), Some("123")).expect("creds");
        assert_eq!(creds, TokenCredentials { token: "abc", timestamp: "123" });
    }

    #[test]
    fn query_wins_over_headers() {
        let creds = extract_token_credentials(Some("q"), Some("1"), Some("Bearer h"), Some("2"))
            .expect("creds");
        assert_eq!(creds, TokenCredentials { token: "q", timestamp: "1" });
    }

    #[test]
    fn mixed_sources() {
        let creds = extract_token_credentials(None, Some("1"), Some("Bearer h"), None).expect("creds");
        assert_eq!(creds, TokenCredentials { token: "h", timestamp: "1" });
    }

    #[test]
    fn missing_parts_require_authentication() {
        assert_eq!(
            extract_token_credentials(Some("abc"), None, None, None),
            Err(Error::AuthenticationRequired)
        );
        assert_eq!(
            extract_token_credentials(None, Some("1"), None, None),
            Err(Error::AuthenticationRequired)
        );
        assert_eq!(
            extract_token_credentials(Some("  "), Some(""), None, None),
            Err(Error::AuthenticationRequired)
        );
    }

    #[test]
    fn non_bearer_scheme_ignored() {
        assert_eq!(
            extract_token_credentials(None, Some("1"), Some("Basic dXNlcg=="), None),
            Err(Error::AuthenticationRequired)
        );
        assert_eq!(
            extract_token_credentials(None, Some("1"), Some("Bearer   "), None),
            Err(Error::AuthenticationRequired)
        );
    }
}
