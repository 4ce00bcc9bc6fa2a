//! # textline-auth
//!
//! Access control for Textline log retrieval.
//!
//! Two schemes are supported:
//!
//! - **Time-boxed tokens**: `HMAC-SHA256(secret, timestamp)` in hex, valid for
//!   a window around the timestamp. See [`TokenService`].
//! - **Admin key**: a static shared key checked in constant time. See
//!   [`verify_admin_key`].
//!
//! ## Example
//!
//! ```rust
//! use textline_auth::{extract_token_credentials, TokenService};
//!
//! let service = TokenService::new("log-secret");
//! let issued = service.issue_now().expect("issue");
//!
//! let creds = extract_token_credentials(
//!     Some(&issued.token),
//!     Some(&issued.timestamp),
//!     None,
//!     None,
//! )
//! .expect("credentials");
//! assert!(service.authenticate(creds.token, creds.timestamp).is_ok());
//! ```
//!
//! Tokens carry no nonce. Anyone holding a token and its timestamp can reuse
//! them until the window closes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod credentials;
pub mod error;
pub mod token;

pub use admin::verify_admin_key;
pub use credentials::{
    extract_token_credentials, TokenCredentials, AUTHORIZATION_HEADER, X_TIMESTAMP_HEADER,
};
pub use error::{Error, Result};
pub use token::{issue, verify, verify_at, IssuedToken, TokenService, DEFAULT_WINDOW_MINUTES};
