//! Persisted entities, as the backend returns them.
//!
//! All of these are owned and mutated by the backend; the client only
//! holds read-only or write-once copies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identity record plus admin flag, one per account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: SmolStr,
    #[serde(default)]
    pub email: Option<SmolStr>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Subset of [`Profile`] listed on the user management view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: SmolStr,
    #[serde(default)]
    pub email: Option<SmolStr>,
    pub created_at: DateTime<Utc>,
}

/// One manual like submission. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeRequest {
    pub id: SmolStr,
    pub user_id: SmolStr,
    pub uid: SmolStr,
    #[serde(default)]
    pub player_name: Option<SmolStr>,
    pub likes_before: i64,
    pub likes_after: i64,
    pub likes_added: i64,
    pub status: i64,
    #[serde(default)]
    pub response_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Scheduled auto-like job configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLike {
    pub id: SmolStr,
    pub uid: SmolStr,
    pub is_active: bool,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<SmolStr>,
}

/// Execution record of a scheduled job, parallel to [`LikeRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoLikeHistoryRecord {
    pub id: SmolStr,
    #[serde(default)]
    pub auto_like_id: Option<SmolStr>,
    pub uid: SmolStr,
    #[serde(default)]
    pub player_name: Option<SmolStr>,
    pub likes_before: i64,
    pub likes_after: i64,
    pub likes_added: i64,
    pub status: i64,
    #[serde(default)]
    pub response_data: serde_json::Value,
    pub executed_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Allowance a user has for manual requests today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAllowance {
    pub daily_requests: i64,
    pub extra_requests: i64,
    pub requests_used_today: i64,
}

impl RequestAllowance {
    /// Requests left today: `max(0, daily + extra - used)`.
    pub fn remaining(&self) -> u32 {
        let left = self
            .daily_requests
            .saturating_add(self.extra_requests)
            .saturating_sub(self.requests_used_today)
            .max(0);
        u32::try_from(left).unwrap_or(u32::MAX)
    }
}

/// Per-user daily quota state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRequestLimit {
    pub user_id: SmolStr,
    #[serde(flatten)]
    pub allowance: RequestAllowance,
    #[serde(default)]
    pub last_reset_date: Option<NaiveDate>,
}
