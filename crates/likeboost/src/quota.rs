//! Requests-remaining display.
//!
//! The tracker re-reads the caller's `user_request_limits` row whenever the
//! signed-in account changes or the orchestrator bumps its refresh counter.

use crate::client::ApiClient;
use likeboost_api::models::RequestAllowance;
use likeboost_api::tables::GetRequestAllowance;
use likeboost_common::error::ClientResult;
use smol_str::SmolStr;
use tokio::sync::watch;

/// Allowance assumed for accounts that have no limits row yet
pub const DEFAULT_DAILY_REQUESTS: u32 = 3;

/// Requests `user_id` may still make today.
pub async fn fetch_remaining<C: ApiClient>(client: &C, user_id: &str) -> ClientResult<u32> {
    let rows = client
        .send(&GetRequestAllowance::new(user_id))
        .await?
        .into_output()?;
    Ok(rows
        .first()
        .map(RequestAllowance::remaining)
        .unwrap_or(DEFAULT_DAILY_REQUESTS))
}

/// Remaining-quota state of one signed-in view.
#[derive(Debug)]
pub struct QuotaTracker {
    refresh: watch::Receiver<u64>,
    user: Option<SmolStr>,
    remaining: Option<u32>,
}

impl QuotaTracker {
    /// Track quota, re-fetching whenever `refresh` changes.
    pub fn new(refresh: watch::Receiver<u64>) -> Self {
        Self {
            refresh,
            user: None,
            remaining: None,
        }
    }

    /// Last known value. `None` while signed out or before the first fetch.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Whether the next [`sync`](Self::sync) would go to the backend.
    pub fn is_stale(&self, user: Option<&str>) -> bool {
        self.user.as_deref() != user
            || self.remaining.is_none()
            || self.refresh.has_changed().unwrap_or(false)
    }

    /// Bring the value up to date with the session and the refresh counter.
    ///
    /// A failed fetch is logged and leaves the previous value in place.
    pub async fn sync<C: ApiClient>(&mut self, client: &C) -> Option<u32> {
        let Some(user_id) = client.user_id().await else {
            self.user = None;
            self.remaining = None;
            return None;
        };
        if self.is_stale(Some(&user_id)) {
            self.fetch(client, user_id).await;
        }
        self.remaining
    }

    /// Wait for the next refresh bump, then re-fetch.
    pub async fn changed<C: ApiClient>(&mut self, client: &C) -> Option<u32> {
        if self.refresh.changed().await.is_err() {
            return self.remaining;
        }
        match client.user_id().await {
            Some(user_id) => self.fetch(client, user_id).await,
            None => {
                self.user = None;
                self.remaining = None;
            }
        }
        self.remaining
    }

    async fn fetch<C: ApiClient>(&mut self, client: &C, user_id: SmolStr) {
        if self.user.as_ref() != Some(&user_id) {
            self.remaining = None;
        }
        // Seen before the request, so a bump landing mid-flight still counts.
        let _ = self.refresh.borrow_and_update();
        match fetch_remaining(client, &user_id).await {
            Ok(remaining) => self.remaining = Some(remaining),
            Err(e) => tracing::error!(error = %e, "Error fetching requests remaining"),
        }
        self.user = Some(user_id);
    }
}
