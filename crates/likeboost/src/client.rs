//! Authenticated access to the backend
//!
//! [`CredentialSession`] owns the sign-in state (tokens, active session
//! label) and sends typed endpoints with the bearer token and project key
//! attached. Every view in this crate talks to the backend through the
//! [`ApiClient`] trait, so tests can drive them with a mock transport.

pub mod credential_session;
pub mod token;

use std::fmt;
use std::future::Future;

pub use credential_session::{CredentialSession, DEFAULT_SESSION, SessionKey};
use likeboost_api::auth::AuthSession;
use likeboost_api::models::Profile;
use likeboost_api::tables::GetProfile;
use likeboost_common::error::ClientResult;
use likeboost_common::http_client::HttpClient;
use likeboost_common::rest::{Endpoint, Response};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
pub use token::FileAuthStore;
use url::Url;

/// Sign-in state kept in a session store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: SmolStr,
    pub refresh_token: SmolStr,
    pub user_id: SmolStr,
    #[serde(default)]
    pub email: Option<SmolStr>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl From<AuthSession> for StoredSession {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            user_id: session.user.id,
            email: session.user.email,
            expires_at: session.expires_at,
        }
    }
}

/// Client that knows its backend and its own credentials.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait ApiClient: HttpClient {
    /// Backend base URL
    fn base_uri(&self) -> impl Future<Output = Url>;

    /// Id of the signed-in account, if any
    fn user_id(&self) -> impl Future<Output = Option<SmolStr>>;

    /// Send a typed request with this client's credentials
    fn send<E>(&self, request: &E) -> impl Future<Output = ClientResult<Response<E>>>
    where
        E: Endpoint + Sync;
}

/// Re-read the signed-in account's profile row.
///
/// `Ok(None)` when signed out or when the account has no profile yet.
pub async fn current_profile<C: ApiClient>(client: &C) -> ClientResult<Option<Profile>> {
    let Some(user_id) = client.user_id().await else {
        return Ok(None);
    };
    let rows = client
        .send(&GetProfile::new(&user_id))
        .await?
        .into_output()?;
    Ok(rows.into_iter().next())
}
