//! Error types for REST client operations

use http::StatusCode;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// Request serialization failed
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// Response deserialization failed
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(
        #[from]
        #[diagnostic_source]
        AuthError,
    ),

    /// The backend answered with an error body
    #[error("{0}")]
    #[diagnostic(code(likeboost::api::remote))]
    Api(#[from] RemoteError),
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Error type for encoding REST requests
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Failed to serialize query parameters
    #[error("Failed to serialize query: {0}")]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Failed to serialize JSON body
    #[error("Failed to serialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// Response deserialization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// JSON deserialization failed
    #[error("Failed to deserialize JSON: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// Body was well-formed but did not match the endpoint contract
    #[error("Unexpected response: {0}")]
    #[diagnostic(code(likeboost::api::unexpected))]
    Unexpected(SmolStr),
}

/// Authentication and authorization errors
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AuthError {
    /// Access token has expired (use refresh token to get a new one)
    #[error("Access token expired")]
    TokenExpired,

    /// Access token is invalid or malformed
    #[error("Invalid access token")]
    InvalidToken,

    /// Token refresh request failed
    #[error("Token refresh failed")]
    RefreshFailed,

    /// Request requires authentication but none was provided
    #[error("No authentication provided, but endpoint requires auth")]
    NotAuthenticated,

    /// Credentials were rejected by the auth service
    #[error("Invalid login credentials")]
    InvalidCredentials,
}

/// Error body returned by the backend.
///
/// The auth service, the table API and the functions each use slightly
/// different shapes, so every field is optional and [`RemoteErrorBody::message`]
/// picks the most specific one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteErrorBody {
    /// `{ "error": "..." }` (functions, auth service)
    #[serde(default)]
    pub error: Option<SmolStr>,
    /// `{ "error_description": "..." }` (auth service)
    #[serde(default)]
    pub error_description: Option<SmolStr>,
    /// `{ "message": "..." }` (table API)
    #[serde(default)]
    pub message: Option<SmolStr>,
    /// `{ "msg": "..." }` (auth service)
    #[serde(default)]
    pub msg: Option<SmolStr>,
    /// `{ "code": "..." }` (table API)
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl RemoteErrorBody {
    /// Best human-readable message present in the body.
    pub fn message(&self) -> Option<&SmolStr> {
        self.error_description
            .as_ref()
            .or(self.message.as_ref())
            .or(self.msg.as_ref())
            .or(self.error.as_ref())
    }

    /// Error code, stringified.
    pub fn code(&self) -> Option<SmolStr> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(SmolStr::new(s)),
            Some(serde_json::Value::Number(n)) => Some(SmolStr::new(n.to_string())),
            _ => None,
        }
    }
}

/// Non-success response from the backend, after decoding its error body
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct RemoteError {
    /// HTTP status code
    pub status: StatusCode,
    /// Message reported by the backend (or the status reason when absent)
    pub message: SmolStr,
    /// Backend error code, if any
    pub code: Option<SmolStr>,
}

impl RemoteError {
    /// Build from a status and a raw body, tolerating non-JSON bodies.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<RemoteErrorBody>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message().cloned())
            .or_else(|| {
                std::str::from_utf8(body)
                    .ok()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(SmolStr::new)
            })
            .unwrap_or_else(|| SmolStr::new(status.canonical_reason().unwrap_or("request failed")));
        Self {
            status,
            message,
            code: parsed.and_then(|b| b.code()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}
