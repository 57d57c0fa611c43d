#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use http::{Response as HttpResponse, StatusCode};
use likeboost::client::{CredentialSession, SessionKey, StoredSession};
use likeboost_common::http_client::HttpClient;
use likeboost_common::session::MemorySessionStore;
use tokio::sync::Mutex;
use url::Url;

pub type Store = MemorySessionStore<SessionKey, StoredSession>;
pub type Session = CredentialSession<Store, MockClient>;

pub const ANON_KEY: &str = "anon-key";
pub const USER_ID: &str = "u-1";

#[derive(Clone, Default)]
pub struct MockClient {
    // Queue of HTTP responses to pop for each send_http call
    queue: Arc<Mutex<VecDeque<HttpResponse<Vec<u8>>>>>,
    // Capture requests for assertions
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    pub async fn push(&self, resp: HttpResponse<Vec<u8>>) {
        self.queue.lock().await.push_back(resp);
    }

    pub async fn push_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push(json(status, body)).await;
    }

    pub async fn push_empty(&self, status: StatusCode) {
        self.push(HttpResponse::builder().status(status).body(Vec::new()).unwrap())
            .await;
    }

    pub async fn take_log(&self) -> Vec<http::Request<Vec<u8>>> {
        let mut log = self.log.lock().await;
        let out = log.clone();
        log.clear();
        out
    }

    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue.lock().await.pop_front().expect("no queued response"))
        }
    }
}

pub fn json(status: StatusCode, body: serde_json::Value) -> HttpResponse<Vec<u8>> {
    HttpResponse::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

pub fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "refresh_token": refresh,
        "user": { "id": USER_ID, "email": "player@example.com" }
    })
}

pub fn profile_body(id: &str, is_admin: bool) -> serde_json::Value {
    serde_json::json!([{
        "id": id,
        "email": "player@example.com",
        "is_admin": is_admin,
        "created_at": "2025-03-01T12:00:00+00:00",
        "updated_at": null
    }])
}

pub fn base() -> Url {
    Url::parse("https://project.example.co").unwrap()
}

pub fn new_session(client: Arc<MockClient>) -> (Arc<Store>, Session) {
    let store: Arc<Store> = Arc::new(Default::default());
    let session = CredentialSession::new(store.clone(), client, base(), ANON_KEY);
    (store, session)
}

/// A session already signed in as [`USER_ID`], with the sign-in call
/// drained from the log.
pub async fn signed_in(client: Arc<MockClient>) -> Session {
    let (_, session) = new_session(client.clone());
    client
        .push_json(StatusCode::OK, token_body("acc1", "ref1"))
        .await;
    session
        .login("player@example.com", "hunter2", None)
        .await
        .expect("login ok");
    client.take_log().await;
    session
}

pub fn body_json(request: &http::Request<Vec<u8>>) -> serde_json::Value {
    serde_json::from_slice(request.body()).expect("json body")
}

pub fn path_and_query(request: &http::Request<Vec<u8>>) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_default()
}
