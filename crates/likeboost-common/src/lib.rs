//! Common types for the likeboost client: HTTP abstraction, typed REST
//! endpoints, errors and session storage.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction used by likeboost crates.
pub mod http_client;
pub mod rest;
/// Generic session storage traits and utilities.
pub mod session;
/// Validated identifier types.
pub mod types;

use http::HeaderValue;
use http::header::InvalidHeaderValue;
use smol_str::SmolStr;

/// Authorization token types for REST requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationToken {
    /// Bearer token (access token, or the project key for anonymous calls)
    Bearer(SmolStr),
}

impl AuthorizationToken {
    /// Raw token value
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bearer(t) => t,
        }
    }
}

impl TryFrom<&AuthorizationToken> for HeaderValue {
    type Error = InvalidHeaderValue;

    fn try_from(token: &AuthorizationToken) -> core::result::Result<Self, Self::Error> {
        HeaderValue::from_str(&match token {
            AuthorizationToken::Bearer(t) => format!("Bearer {t}"),
        })
    }
}
