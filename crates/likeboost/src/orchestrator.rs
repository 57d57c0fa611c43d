//! Like-request workflow: one UID in, one outcome out.
//!
//! ```text
//! Idle -> Submitting -> { Success | AlreadyClaimed | Error } -> Idle
//! ```
//!
//! The phase lives behind a mutex and a second submission while one is in
//! flight is refused with [`RequestError::InFlight`]. A successful delivery
//! bumps the refresh counter that [`QuotaTracker`](crate::quota::QuotaTracker)
//! watches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use likeboost_api::functions::{AlreadyClaimed, LikeOutcome, LikeSuccess, ProcessLikes};
use likeboost_common::error::ClientError;
use likeboost_common::types::{EmptyUid, Uid};
use miette::Diagnostic;
use rand::Rng;
use smol_str::SmolStr;
use tokio::sync::{Mutex, watch};

use crate::client::ApiClient;
use crate::config::DemoConfig;

/// UID that always yields a canned success
pub const DEMO_SUCCESS_UID: &str = "69";
/// UID that always yields a canned already-claimed outcome
pub const DEMO_CLAIMED_UID: &str = "96";

/// Message shown for any delivery failure
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum RequestError {
    #[error("a request is already in progress")]
    #[diagnostic(code(likeboost::request::in_flight))]
    InFlight,

    #[error("sign in to request likes")]
    #[diagnostic(code(likeboost::request::signed_out))]
    NotSignedIn,

    #[error("No Requests Remaining")]
    #[diagnostic(
        code(likeboost::request::quota),
        help("the daily allowance resets tomorrow")
    )]
    QuotaExhausted,

    #[error(transparent)]
    #[diagnostic(transparent)]
    EmptyUid(#[from] EmptyUid),

    #[error("{}", GENERIC_FAILURE)]
    #[diagnostic(code(likeboost::request::delivery))]
    Delivery(#[source] ClientError),
}

/// Where the single outstanding request stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Submitting {
        uid: Uid,
    },
    Success(LikeSuccess),
    AlreadyClaimed(AlreadyClaimed),
    Error(SmolStr),
}

impl RequestPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success(_) | Self::AlreadyClaimed(_) | Self::Error(_)
        )
    }
}

/// Whether the submit control is enabled.
///
/// `remaining` is `None` while signed out or before the quota is known.
pub fn can_submit(uid: &str, remaining: Option<u32>, submitting: bool) -> bool {
    !submitting && !uid.trim().is_empty() && matches!(remaining, Some(n) if n > 0)
}

/// Canned outcome for a sentinel UID, if `uid` is one.
pub fn demo_outcome(uid: &Uid, now: DateTime<Utc>) -> Option<LikeOutcome> {
    match uid.as_str() {
        DEMO_SUCCESS_UID => {
            let likes_before = rand::rng().random_range(5000..15000);
            Some(LikeOutcome::Success(LikeSuccess {
                player: Some("DemoPlayer".into()),
                uid: Some(uid.clone().into()),
                likes_before,
                likes_after: likes_before + 100,
                likes_added: 100,
                message: Some("Likes sent successfully!".into()),
            }))
        }
        DEMO_CLAIMED_UID => Some(LikeOutcome::AlreadyClaimed(AlreadyClaimed {
            message: Some(
                "You have already requested likes for this UID today. Please try again tomorrow."
                    .into(),
            ),
            next_available: Some(now + chrono::Duration::hours(24)),
        })),
        _ => None,
    }
}

/// Drives like requests for one signed-in view.
pub struct RequestOrchestrator<C> {
    client: Arc<C>,
    demo: DemoConfig,
    phase: Mutex<RequestPhase>,
    refresh: watch::Sender<u64>,
}

impl<C: ApiClient + Sync> RequestOrchestrator<C> {
    pub fn new(client: Arc<C>, demo: DemoConfig) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            client,
            demo,
            phase: Mutex::new(RequestPhase::Idle),
            refresh,
        }
    }

    /// Counter bumped after every successful delivery.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    pub async fn phase(&self) -> RequestPhase {
        self.phase.lock().await.clone()
    }

    /// Close a finished result and return to `Idle`.
    ///
    /// Also clears a `Submitting` phase orphaned by a dropped submit future.
    pub async fn acknowledge(&self) -> RequestPhase {
        std::mem::take(&mut *self.phase.lock().await)
    }

    /// Same as [`acknowledge`](Self::acknowledge).
    pub async fn reset(&self) -> RequestPhase {
        self.acknowledge().await
    }

    /// Submit `uid` for delivery.
    ///
    /// `remaining` is the caller's current quota; a value of `Some(0)` or
    /// `None` refuses the request without touching the backend.
    pub async fn submit(
        &self,
        uid: &str,
        remaining: Option<u32>,
    ) -> Result<LikeOutcome, RequestError> {
        let uid = {
            let mut phase = self.phase.lock().await;
            if phase.is_submitting() {
                return Err(RequestError::InFlight);
            }
            let uid = Uid::new(uid)?;
            match remaining {
                None => return Err(RequestError::NotSignedIn),
                Some(0) => return Err(RequestError::QuotaExhausted),
                Some(_) => {}
            }
            *phase = RequestPhase::Submitting { uid: uid.clone() };
            uid
        };

        let result = self.deliver(&uid).await;

        let mut phase = self.phase.lock().await;
        match &result {
            Ok(LikeOutcome::Success(s)) => {
                *phase = RequestPhase::Success(s.clone());
                self.refresh.send_modify(|n| *n += 1);
            }
            Ok(LikeOutcome::AlreadyClaimed(c)) => {
                *phase = RequestPhase::AlreadyClaimed(c.clone());
            }
            Err(e) => {
                *phase = RequestPhase::Error(SmolStr::new_static(GENERIC_FAILURE));
                tracing::error!(uid = %uid, error = ?e, "Error processing like request");
            }
        }
        result
    }

    async fn deliver(&self, uid: &Uid) -> Result<LikeOutcome, RequestError> {
        if self.demo.enabled {
            if let Some(outcome) = demo_outcome(uid, Utc::now()) {
                tracing::debug!(uid = %uid, "demo UID, skipping backend");
                tokio::time::sleep(self.demo.delay).await;
                return Ok(outcome);
            }
        }
        self.client
            .send(&ProcessLikes::new(uid.clone()))
            .await
            .and_then(|resp| resp.into_output())
            .map_err(RequestError::Delivery)
    }
}
