//! Time-boxed access tokens derived from a shared secret.
//!
//! A token is `HMAC-SHA256(secret, timestamp)` rendered as lowercase hex,
//! where `timestamp` is the decimal Unix time in milliseconds that the
//! caller presents alongside it. Validity depends only on the token, the
//! timestamp, the current time and the secret, so no server-side state is
//! kept. Tokens are deterministic: the same secret and timestamp always yield
//! the same token, and a captured pair stays usable until the window closes.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Default validity window in minutes.
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Derives the token for `timestamp` under `secret`.
///
/// # Errors
///
/// Returns [`Error::CryptoError`] if the MAC cannot be keyed.
pub fn issue(secret: &[u8], timestamp: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| Error::CryptoError {
        reason: e.to_string(),
    })?;
    mac.update(timestamp.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies `token` against the current wall-clock time.
#[must_use]
pub fn verify(token: &str, secret: &[u8], timestamp: &str, window_minutes: u32) -> bool {
    verify_at(token, secret, timestamp, window_minutes, Utc::now().timestamp_millis())
}

/// Verifies `token` as of `now_ms`.
///
/// Rejects timestamps that are not integers, that lie more than
/// `window_minutes` away from `now_ms` in either direction, and tokens whose
/// bytes differ from the expected derivation.
#[must_use]
pub fn verify_at(token: &str, secret: &[u8], timestamp: &str, window_minutes: u32, now_ms: i64) -> bool {
    let Ok(issued_ms) = timestamp.trim().parse::<i64>() else {
        debug!(timestamp, "token timestamp is not an integer");
        return false;
    };

    let window_ms = u64::from(window_minutes) * MILLIS_PER_MINUTE;
    if now_ms.abs_diff(issued_ms) > window_ms {
        debug!(issued_ms, now_ms, "token outside validity window");
        return false;
    }

    let Ok(expected) = issue(secret, timestamp) else {
        return false;
    };

    // ct_eq on slices of unequal length returns false
    token.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// A freshly issued token with its timing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Hex-encoded HMAC.
    pub token: String,
    /// Issue time in Unix milliseconds, as the client must echo it back.
    pub timestamp: String,
    /// When the token stops verifying.
    #[serde(serialize_with = "serialize_iso")]
    pub expires_at: DateTime<Utc>,
}

fn serialize_iso<S: serde::Serializer>(
    time: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

/// The shared log-access secret, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct Secret(Vec<u8>);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Issues and checks tokens for one configured secret.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: Secret,
    window_minutes: u32,
}

impl TokenService {
    /// Creates a service with the default one-hour window.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Secret(secret.into()),
            window_minutes: DEFAULT_WINDOW_MINUTES,
        }
    }

    /// Sets the validity window.
    #[must_use]
    pub const fn with_window_minutes(mut self, minutes: u32) -> Self {
        self.window_minutes = minutes;
        self
    }

    /// Returns the validity window in minutes.
    #[must_use]
    pub const fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    /// Issues a token stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CryptoError`] if the MAC cannot be keyed.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<IssuedToken> {
        let timestamp = now.timestamp_millis().to_string();
        let token = issue(&self.secret.0, &timestamp)?;
        Ok(IssuedToken {
            token,
            timestamp,
            expires_at: now + Duration::minutes(i64::from(self.window_minutes)),
        })
    }

    /// Issues a token stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CryptoError`] if the MAC cannot be keyed.
    pub fn issue_now(&self) -> Result<IssuedToken> {
        self.issue_at(Utc::now())
    }

    /// Checks presented credentials as of `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAuthentication`] if the token does not verify.
    pub fn authenticate_at(&self, token: &str, timestamp: &str, now_ms: i64) -> Result<()> {
        if verify_at(token, &self.secret.0, timestamp, self.window_minutes, now_ms) {
            Ok(())
        } else {
            Err(Error::InvalidAuthentication {
                reason: "invalid or expired token",
            })
        }
    }

    /// Checks presented credentials against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAuthentication`] if the token does not verify.
    pub fn authenticate(&self, token: &str, timestamp: &str) -> Result<()> {
        self.authenticate_at(token, timestamp, Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    const SECRET: &[u8] = b"test-log-secret";
    const NOW: i64 = 1_750_000_000_000;
    const HOUR_MS: i64 = 60 * 60_000;

    fn token_at(ms: i64) -> String {
        issue(SECRET, &ms.to_string()).unwrap_or_default()
    }

    #[test]
    fn issue_is_deterministic_lowercase_hex() {
        let a = token_at(NOW);
        let b = token_at(NOW);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn issue_matches_reference_vector() {
        // RFC 4231 test case 2
        let token = issue(b"Jefe", "what do ya want for nothing?").unwrap_or_default();
        assert_eq!(
            token,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn different_secrets_give_different_tokens() {
        let a = issue(b"one", "1").unwrap_or_default();
        let b = issue(b"two", "1").unwrap_or_default();
        assert_ne!(a, b);
    }

    #[test_case(0, true ; "same instant")]
    #[test_case(HOUR_MS - 1, true ; "boundary minus one ms")]
    #[test_case(HOUR_MS, true ; "exactly at boundary")]
    #[test_case(HOUR_MS + 1, false ; "boundary plus one ms")]
    #[test_case(-(HOUR_MS - 1), true ; "future within window")]
    #[test_case(-(HOUR_MS + 1), false ; "future beyond window")]
    fn window_boundaries(age_ms: i64, expected: bool) {
        let issued = NOW - age_ms;
        let token = token_at(issued);
        assert_eq!(
            verify_at(&token, SECRET, &issued.to_string(), DEFAULT_WINDOW_MINUTES, NOW),
            expected
        );
    }

    #[test_case("" ; "empty")]
    #[test_case("yesterday" ; "word")]
    #[test_case("1.5e12" ; "float")]
    fn non_integer_timestamp_rejected(timestamp: &str) {
        let token = issue(SECRET, timestamp).unwrap_or_default();
        assert!(!verify_at(&token, SECRET, timestamp, DEFAULT_WINDOW_MINUTES, NOW));
    }

    #[test]
    fn truncated_token_rejected() {
        let token = token_at(NOW);
        assert!(!verify_at(&token[..63], SECRET, &NOW.to_string(), 60, NOW));
        assert!(!verify_at("", SECRET, &NOW.to_string(), 60, NOW));
    }

    #[test]
    fn uppercase_token_rejected() {
        let token = token_at(NOW).to_uppercase();
        assert!(!verify_at(&token, SECRET, &NOW.to_string(), 60, NOW));
    }

    #[test]
    fn service_issue_then_authenticate() {
        let service = TokenService::new(SECRET.to_vec());
        let now = DateTime::from_timestamp_millis(NOW).unwrap_or_default();
        let issued = service.issue_at(now).expect("issue");

        assert_eq!(issued.timestamp, NOW.to_string());
        assert_eq!(issued.expires_at - now, Duration::minutes(60));
        assert!(service.authenticate_at(&issued.token, &issued.timestamp, NOW + 1000).is_ok());
        assert_eq!(
            service.authenticate_at(&issued.token, &issued.timestamp, NOW + HOUR_MS + 1),
            Err(Error::InvalidAuthentication {
                reason: "invalid or expired token"
            })
        );
    }

    #[test]
    fn service_custom_window() {
        let service = TokenService::new("s").with_window_minutes(5);
        assert_eq!(service.window_minutes(), 5);
        let token = issue(b"s", &NOW.to_string()).unwrap_or_default();
        assert!(service.authenticate_at(&token, &NOW.to_string(), NOW + 5 * 60_000).is_ok());
        assert!(service.authenticate_at(&token, &NOW.to_string(), NOW + 5 * 60_000 + 1).is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let service = TokenService::new("super-secret-value");
        let debug = format!("{service:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn issued_token_serializes_camel_case() {
        let service = TokenService::new("s");
        let now = DateTime::from_timestamp_millis(NOW).unwrap_or_default();
        let issued = service.issue_at(now).expect("issue");
        let json = serde_json::to_value(&issued).unwrap_or_default();
        assert_eq!(json["timestamp"], NOW.to_string());
        assert_eq!(json["expiresAt"], "2025-06-15T16:06:40.000Z");
        assert!(json["token"].is_string());
    }

    proptest! {
        #[test]
        fn issued_token_verifies_within_window(
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            offset in -HOUR_MS..=HOUR_MS,
        ) {
            let issued = NOW + offset;
            let token = issue(&secret, &issued.to_string()).unwrap_or_default();
            prop_assert!(verify_at(&token, &secret, &issued.to_string(), 60, NOW));
        }

        #[test]
        fn flipping_any_byte_fails(index in 0usize..64, flip in 1u8..=255) {
            let token = token_at(NOW);
            let mut bytes = token.into_bytes();
            bytes[index] ^= flip;
            let tampered = String::from_utf8_lossy(&bytes).into_owned();
            prop_assert!(!verify_at(&tampered, SECRET, &NOW.to_string(), 60, NOW));
        }
    }
}
