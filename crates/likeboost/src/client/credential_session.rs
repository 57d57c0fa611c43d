use std::sync::Arc;

use likeboost_api::auth::{Logout, PasswordGrant, RefreshTokenGrant};
use likeboost_common::{
    AuthorizationToken,
    error::{AuthError, ClientError, ClientResult, TransportError},
    http_client::HttpClient,
    rest::{CallOptions, Endpoint, Response, RestExt},
    session::SessionStore,
};
use http::StatusCode;
use smol_str::SmolStr;
use tokio::sync::RwLock;
use url::Url;

use crate::client::{ApiClient, StoredSession};

/// Storage key for sessions: a free-form label, [`DEFAULT_SESSION`] unless
/// the caller keeps several accounts side by side.
pub type SessionKey = SmolStr;

/// Label used when none is given at sign-in
pub const DEFAULT_SESSION: &str = "default";

/// Stateful client for email/password sessions.
///
/// - Persists sessions via a pluggable `SessionStore`.
/// - Refreshes the access token once when the backend reports it expired.
/// - Attaches the project key to every call, signed in or not.
pub struct CredentialSession<S, T>
where
    S: SessionStore<SessionKey, StoredSession>,
{
    store: Arc<S>,
    client: Arc<T>,
    endpoint: Url,
    /// Default call options applied to each request (project key, headers).
    pub options: RwLock<CallOptions>,
    /// Active session key, if any.
    pub key: RwLock<Option<SessionKey>>,
}

impl<S, T> CredentialSession<S, T>
where
    S: SessionStore<SessionKey, StoredSession>,
{
    /// Create a signed-out session against `endpoint` using the project key.
    pub fn new(store: Arc<S>, client: Arc<T>, endpoint: Url, api_key: impl Into<SmolStr>) -> Self {
        Self {
            store,
            client,
            endpoint,
            options: RwLock::new(CallOptions {
                api_key: Some(api_key.into()),
                ..Default::default()
            }),
            key: RwLock::new(None),
        }
    }

    /// Replace default call options.
    pub async fn set_options(&self, options: CallOptions) {
        *self.options.write().await = options;
    }

    /// Backend base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Active session label, if signed in.
    pub async fn session_info(&self) -> Option<SessionKey> {
        self.key.read().await.clone()
    }

    /// Stored state of the active session.
    pub async fn session(&self) -> Option<StoredSession> {
        let key = self.key.read().await.clone()?;
        self.store.get(&key).await
    }

    /// Current access token (Bearer), if signed in.
    pub async fn access_token(&self) -> Option<AuthorizationToken> {
        self.session()
            .await
            .map(|session| AuthorizationToken::Bearer(session.access_token))
    }

    /// Current refresh token, if signed in.
    pub async fn refresh_token(&self) -> Option<SmolStr> {
        self.session().await.map(|session| session.refresh_token)
    }

    async fn anonymous_options(&self) -> CallOptions {
        let mut opts = self.options.read().await.clone();
        opts.auth = None;
        opts
    }
}

impl<S, T> CredentialSession<S, T>
where
    S: SessionStore<SessionKey, StoredSession>,
    T: HttpClient + Sync,
{
    /// Exchange the refresh token for a new access token and persist it.
    pub async fn refresh(&self) -> Result<AuthorizationToken, ClientError> {
        let key = self
            .key
            .read()
            .await
            .clone()
            .ok_or(ClientError::Auth(AuthError::NotAuthenticated))?;
        let refresh_token = self
            .store
            .get(&key)
            .await
            .map(|s| s.refresh_token)
            .ok_or(ClientError::Auth(AuthError::NotAuthenticated))?;

        let response = self
            .client
            .rest(self.endpoint.clone())
            .with_options(self.anonymous_options().await)
            .send(&RefreshTokenGrant { refresh_token })
            .await?;
        let refreshed = response.parse().map_err(|e| {
            tracing::warn!(error = %e, "token refresh rejected");
            ClientError::Auth(AuthError::RefreshFailed)
        })?;

        let session = StoredSession::from(refreshed);
        let token = AuthorizationToken::Bearer(session.access_token.clone());
        self.store
            .set(key, session)
            .await
            .map_err(|_| ClientError::Auth(AuthError::RefreshFailed))?;

        Ok(token)
    }

    /// Sign in with email and password, then persist and activate the session.
    ///
    /// `session_id` defaults to [`DEFAULT_SESSION`].
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        session_id: Option<SessionKey>,
    ) -> Result<StoredSession, ClientError> {
        let _span = tracing::info_span!("credential_session_login", email = %email).entered();

        let request = PasswordGrant {
            email: email.trim().into(),
            password: password.into(),
        };
        let response = self
            .client
            .rest(self.endpoint.clone())
            .with_options(self.anonymous_options().await)
            .send(&request)
            .await?;
        let session = match response.parse() {
            Ok(out) => StoredSession::from(out),
            Err(ClientError::Api(err)) if err.status == StatusCode::BAD_REQUEST => {
                tracing::debug!(message = %err.message, "sign-in rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let key = session_id.unwrap_or_else(|| SmolStr::new_static(DEFAULT_SESSION));
        self.store
            .set(key.clone(), session.clone())
            .await
            .map_err(|e| ClientError::Transport(TransportError::Other(Box::new(e))))?;
        *self.key.write().await = Some(key);
        tracing::info!(user_id = %session.user_id, "signed in");

        Ok(session)
    }

    /// Reactivate a previously persisted session.
    pub async fn restore(&self, session_id: &str) -> Result<StoredSession, ClientError> {
        let _span = tracing::info_span!("credential_session_restore", session_id = %session_id)
            .entered();

        let key = SmolStr::new(session_id);
        let Some(session) = self.store.get(&key).await else {
            return Err(ClientError::Auth(AuthError::NotAuthenticated));
        };
        *self.key.write().await = Some(key);
        Ok(session)
    }

    /// Revoke the session remotely (best effort) and delete it from the store.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Some(key) = self.key.read().await.clone() else {
            return Ok(());
        };
        if let Some(session) = self.store.get(&key).await {
            let mut opts = self.anonymous_options().await;
            opts.auth = Some(AuthorizationToken::Bearer(session.access_token));
            let revoked = self
                .client
                .rest(self.endpoint.clone())
                .with_options(opts)
                .send(&Logout::default())
                .await
                .and_then(|resp| resp.into_output());
            if let Err(e) = revoked {
                tracing::warn!(error = %e, "remote sign-out failed, dropping local session anyway");
            }
        }
        self.store
            .del(&key)
            .await
            .map_err(|e| ClientError::Transport(TransportError::Other(Box::new(e))))?;
        *self.key.write().await = None;
        Ok(())
    }
}

impl<S, T> HttpClient for CredentialSession<S, T>
where
    S: SessionStore<SessionKey, StoredSession> + Send + Sync + 'static,
    T: HttpClient + Send + Sync + 'static,
{
    type Error = T::Error;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
        self.client.send_http(request).await
    }
}

impl<S, T> ApiClient for CredentialSession<S, T>
where
    S: SessionStore<SessionKey, StoredSession> + Send + Sync + 'static,
    T: HttpClient + Send + Sync + 'static,
{
    async fn base_uri(&self) -> Url {
        self.endpoint.clone()
    }

    async fn user_id(&self) -> Option<SmolStr> {
        self.session().await.map(|session| session.user_id)
    }

    async fn send<E>(&self, request: &E) -> ClientResult<Response<E>>
    where
        E: Endpoint + Sync,
    {
        let mut opts = self.options.read().await.clone();
        opts.auth = self.access_token().await;
        let resp = self
            .client
            .rest(self.endpoint.clone())
            .with_options(opts.clone())
            .send(request)
            .await;

        if is_expired(&resp) {
            tracing::debug!(path = E::PATH, "access token expired, refreshing");
            opts.auth = Some(self.refresh().await?);
            self.client
                .rest(self.endpoint.clone())
                .with_options(opts)
                .send(request)
                .await
        } else {
            resp
        }
    }
}

#[inline]
fn is_expired<E: Endpoint>(response: &ClientResult<Response<E>>) -> bool {
    match response {
        Err(ClientError::Auth(AuthError::TokenExpired)) => true,
        Ok(resp) => resp.is_token_expired(),
        _ => false,
    }
}
