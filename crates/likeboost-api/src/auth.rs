//! Hosted auth service: password sign-in, token refresh and sign-out.

use likeboost_common::error::EncodeError;
use likeboost_common::rest::{Endpoint, RestMethod};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

const TOKEN_PATH: &str = "/auth/v1/token";

fn grant_type(grant: &str) -> Result<Option<String>, EncodeError> {
    Ok(Some(serde_html_form::to_string(&[("grant_type", grant)])?))
}

/// Exchange email and password for a session.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordGrant {
    pub email: SmolStr,
    pub password: SmolStr,
}

impl fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Endpoint for PasswordGrant {
    const PATH: &'static str = TOKEN_PATH;
    const METHOD: RestMethod = RestMethod::Post;
    type Output = AuthSession;

    fn query(&self) -> Result<Option<String>, EncodeError> {
        grant_type("password")
    }
}

/// Exchange a refresh token for a fresh session.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshTokenGrant {
    pub refresh_token: SmolStr,
}

impl fmt::Debug for RefreshTokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenGrant").finish_non_exhaustive()
    }
}

impl Endpoint for RefreshTokenGrant {
    const PATH: &'static str = TOKEN_PATH;
    const METHOD: RestMethod = RestMethod::Post;
    type Output = AuthSession;

    fn query(&self) -> Result<Option<String>, EncodeError> {
        grant_type("refresh_token")
    }
}

/// Revoke the session behind the bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Logout {}

impl Endpoint for Logout {
    const PATH: &'static str = "/auth/v1/logout";
    const METHOD: RestMethod = RestMethod::Post;
    type Output = ();
}

/// Account behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: SmolStr,
    #[serde(default)]
    pub email: Option<SmolStr>,
}

/// Token response of the auth service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: SmolStr,
    #[serde(default)]
    pub token_type: Option<SmolStr>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: SmolStr,
    pub user: AuthUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
