//! Direct reads and writes against `profiles`, `user_request_limits` and
//! `auto_likes` through the table API.
//!
//! Reads encode their filters as the query string (`select`, `order`,
//! `<column>=eq.<value>`). Writes put the changed columns in the body and
//! the row filter in [`Endpoint::query`].

use crate::models::{AutoLike, Profile, ProfileSummary, RequestAllowance, UserRequestLimit};
use chrono::{DateTime, Utc};
use http::{HeaderName, HeaderValue};
use likeboost_common::error::EncodeError;
use likeboost_common::rest::{Endpoint, RestMethod};
use likeboost_common::types::Uid;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

const PROFILES: &str = "/rest/v1/profiles";
const USER_REQUEST_LIMITS: &str = "/rest/v1/user_request_limits";
const AUTO_LIKES: &str = "/rest/v1/auto_likes";

/// Equality filter value, `eq.<value>`
pub fn eq(value: impl std::fmt::Display) -> SmolStr {
    SmolStr::from(format!("eq.{value}"))
}

fn filter(column: &str, value: &str) -> Result<Option<String>, EncodeError> {
    Ok(Some(serde_html_form::to_string(&[(column, eq(value))])?))
}

fn return_minimal() -> Vec<(HeaderName, HeaderValue)> {
    vec![(
        HeaderName::from_static("prefer"),
        HeaderValue::from_static("return=minimal"),
    )]
}

/// Profile of one account (`maybeSingle`: zero or one row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProfile {
    pub select: SmolStr,
    pub id: SmolStr,
}

impl GetProfile {
    pub fn new(user_id: &str) -> Self {
        Self {
            select: "*".into(),
            id: eq(user_id),
        }
    }
}

impl Endpoint for GetProfile {
    const PATH: &'static str = PROFILES;
    const METHOD: RestMethod = RestMethod::Get;
    type Output = Vec<Profile>;
}

/// Every profile, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProfiles {
    pub select: SmolStr,
    pub order: SmolStr,
}

impl Default for ListProfiles {
    fn default() -> Self {
        Self {
            select: "id,email,created_at".into(),
            order: "created_at.desc".into(),
        }
    }
}

impl Endpoint for ListProfiles {
    const PATH: &'static str = PROFILES;
    const METHOD: RestMethod = RestMethod::Get;
    type Output = Vec<ProfileSummary>;
}

/// Quota counters of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequestAllowance {
    pub select: SmolStr,
    pub user_id: SmolStr,
}

impl GetRequestAllowance {
    pub fn new(user_id: &str) -> Self {
        Self {
            select: "daily_requests,extra_requests,requests_used_today".into(),
            user_id: eq(user_id),
        }
    }
}

impl Endpoint for GetRequestAllowance {
    const PATH: &'static str = USER_REQUEST_LIMITS;
    const METHOD: RestMethod = RestMethod::Get;
    type Output = Vec<RequestAllowance>;
}

/// Full limits row of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequestLimits {
    pub select: SmolStr,
    pub user_id: SmolStr,
}

impl GetRequestLimits {
    pub fn new(user_id: &str) -> Self {
        Self {
            select: "*".into(),
            user_id: eq(user_id),
        }
    }
}

impl Endpoint for GetRequestLimits {
    const PATH: &'static str = USER_REQUEST_LIMITS;
    const METHOD: RestMethod = RestMethod::Get;
    type Output = Vec<UserRequestLimit>;
}

/// Override the base and bonus allowance of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct UpdateRequestLimits {
    #[serde(skip)]
    #[builder(into)]
    pub user_id: SmolStr,
    pub daily_requests: i64,
    pub extra_requests: i64,
}

impl Endpoint for UpdateRequestLimits {
    const PATH: &'static str = USER_REQUEST_LIMITS;
    const METHOD: RestMethod = RestMethod::Patch;
    type Output = ();

    fn query(&self) -> Result<Option<String>, EncodeError> {
        filter("user_id", &self.user_id)
    }

    fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        return_minimal()
    }
}

/// Every scheduled auto-like, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAutoLikes {
    pub select: SmolStr,
    pub order: SmolStr,
}

impl Default for ListAutoLikes {
    fn default() -> Self {
        Self {
            select: "*".into(),
            order: "created_at.desc".into(),
        }
    }
}

impl Endpoint for ListAutoLikes {
    const PATH: &'static str = AUTO_LIKES;
    const METHOD: RestMethod = RestMethod::Get;
    type Output = Vec<AutoLike>;
}

/// Schedule a new auto-like job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[builder(start_fn = new)]
pub struct InsertAutoLike {
    pub uid: Uid,
    #[builder(default = true)]
    pub is_active: bool,
    pub next_run_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub created_by: Option<SmolStr>,
}

impl Endpoint for InsertAutoLike {
    const PATH: &'static str = AUTO_LIKES;
    const METHOD: RestMethod = RestMethod::Post;
    type Output = ();

    fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        return_minimal()
    }
}

/// Pause or resume an auto-like job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAutoLikeActive {
    #[serde(skip)]
    pub id: SmolStr,
    pub is_active: bool,
}

impl Endpoint for SetAutoLikeActive {
    const PATH: &'static str = AUTO_LIKES;
    const METHOD: RestMethod = RestMethod::Patch;
    type Output = ();

    fn query(&self) -> Result<Option<String>, EncodeError> {
        filter("id", &self.id)
    }

    fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        return_minimal()
    }
}

/// Remove an auto-like job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAutoLike {
    #[serde(skip)]
    pub id: SmolStr,
}

impl Endpoint for DeleteAutoLike {
    const PATH: &'static str = AUTO_LIKES;
    const METHOD: RestMethod = RestMethod::Delete;
    type Output = ();

    fn query(&self) -> Result<Option<String>, EncodeError> {
        filter("id", &self.id)
    }
}
