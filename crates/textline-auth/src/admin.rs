//! Static admin-key authorization.

use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::{Error, Result};

/// Checks `provided` against the configured admin key in constant time.
///
/// # Errors
///
/// Returns [`Error::AdminKeyNotConfigured`] when no key is configured and
/// [`Error::InvalidAdminKey`] when the key is missing or does not match.
pub fn verify_admin_key(expected: Option<&str>, provided: Option<&str>) -> Result<()> {
    let Some(expected) = expected.filter(|k| !k.is_empty()) else {
        warn!("admin key requested but none is configured");
        return Err(Error::AdminKeyNotConfigured);
    };
    let provided = provided.unwrap_or_default();

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(Error::InvalidAdminKey)
    }
}
