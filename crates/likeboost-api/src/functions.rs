//! Serverless functions: like delivery and privileged user creation.

use chrono::{DateTime, Utc};
use likeboost_common::rest::{Endpoint, RestMethod};
use likeboost_common::types::Uid;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// `status` value of a delivered request
pub const STATUS_SUCCESS: i64 = 1;
/// `status` value of a UID that already claimed likes in the last 24 hours
pub const STATUS_ALREADY_CLAIMED: i64 = 0;

/// Ask the backend to deliver likes to a UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLikes {
    pub uid: Uid,
}

impl ProcessLikes {
    pub fn new(uid: Uid) -> Self {
        Self { uid }
    }
}

impl Endpoint for ProcessLikes {
    const PATH: &'static str = "/functions/v1/process-likes";
    const METHOD: RestMethod = RestMethod::Post;
    // Rejections come back as a regular outcome body.
    const OUTPUT_ON_ERROR: bool = true;
    type Output = LikeOutcome;
}

/// Payload of a delivered request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeSuccess {
    pub player: Option<SmolStr>,
    pub uid: Option<SmolStr>,
    pub likes_before: i64,
    pub likes_after: i64,
    pub likes_added: i64,
    pub message: Option<SmolStr>,
}

/// Payload of a rejected (already claimed) request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyClaimed {
    pub message: Option<SmolStr>,
    pub next_available: Option<DateTime<Utc>>,
}

/// Result of a like-delivery call, validated at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLikeResponse", into = "RawLikeResponse")]
pub enum LikeOutcome {
    Success(LikeSuccess),
    AlreadyClaimed(AlreadyClaimed),
}

impl LikeOutcome {
    /// Wire status code of this outcome
    pub fn status(&self) -> i64 {
        match self {
            Self::Success(_) => STATUS_SUCCESS,
            Self::AlreadyClaimed(_) => STATUS_ALREADY_CLAIMED,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Wire shape of the like-delivery response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLikeResponse {
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes_before: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes_after: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes_added: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_available: Option<DateTime<Utc>>,
}

/// A like-delivery body that is neither a success nor a rejection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[diagnostic(code(likeboost::api::like_outcome))]
pub enum InvalidOutcome {
    #[error("missing status")]
    MissingStatus,
    #[error("unknown status {0}")]
    UnknownStatus(i64),
    #[error("success response without {0}")]
    MissingField(&'static str),
}

impl TryFrom<RawLikeResponse> for LikeOutcome {
    type Error = InvalidOutcome;

    fn try_from(raw: RawLikeResponse) -> Result<Self, Self::Error> {
        match raw.status.ok_or(InvalidOutcome::MissingStatus)? {
            STATUS_SUCCESS => {
                let likes_before = raw
                    .likes_before
                    .ok_or(InvalidOutcome::MissingField("likes_before"))?;
                let likes_after = raw
                    .likes_after
                    .ok_or(InvalidOutcome::MissingField("likes_after"))?;
                Ok(Self::Success(LikeSuccess {
                    player: raw.player,
                    uid: raw.uid,
                    likes_before,
                    likes_after,
                    likes_added: raw.likes_added.unwrap_or(likes_after - likes_before),
                    message: raw.message,
                }))
            }
            STATUS_ALREADY_CLAIMED => Ok(Self::AlreadyClaimed(AlreadyClaimed {
                message: raw.message,
                next_available: raw.next_available,
            })),
            other => Err(InvalidOutcome::UnknownStatus(other)),
        }
    }
}

impl From<LikeOutcome> for RawLikeResponse {
    fn from(outcome: LikeOutcome) -> Self {
        match outcome {
            LikeOutcome::Success(s) => Self {
                status: Some(STATUS_SUCCESS),
                player: s.player,
                uid: s.uid,
                likes_before: Some(s.likes_before),
                likes_after: Some(s.likes_after),
                likes_added: Some(s.likes_added),
                message: s.message,
                next_available: None,
            },
            LikeOutcome::AlreadyClaimed(c) => Self {
                status: Some(STATUS_ALREADY_CLAIMED),
                message: c.message,
                next_available: c.next_available,
                ..Default::default()
            },
        }
    }
}

/// Create an account. Requires an admin bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: SmolStr,
    pub password: SmolStr,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserOutput {
    #[serde(default)]
    pub message: Option<SmolStr>,
}

impl Endpoint for CreateUser {
    const PATH: &'static str = "/functions/v1/create-user";
    const METHOD: RestMethod = RestMethod::Post;
    type Output = CreateUserOutput;
}
