//! Admin dashboard and user management.
//!
//! Both views re-read the caller's profile on open and refuse to do anything
//! unless it carries `is_admin`. Every mutation is a single request followed
//! by a refetch of the affected list.

use chrono::{DateTime, Days, NaiveTime, Utc};
use futures::future::join_all;
use likeboost_api::functions::{CreateUser, CreateUserOutput};
use likeboost_api::models::{AutoLike, Profile, ProfileSummary, UserRequestLimit};
use likeboost_api::tables::{
    DeleteAutoLike, GetRequestLimits, InsertAutoLike, ListAutoLikes, ListProfiles,
    SetAutoLikeActive, UpdateRequestLimits,
};
use likeboost_common::error::ClientError;
use likeboost_common::types::{EmptyUid, Uid};
use miette::Diagnostic;
use smol_str::SmolStr;
use std::cmp::Ordering;

use crate::client::{ApiClient, current_profile};
use crate::quota::DEFAULT_DAILY_REQUESTS;

/// Hour (UTC) at which newly scheduled auto-likes first run
pub const AUTO_LIKE_RUN_HOUR: u32 = 5;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum AdminError {
    #[error("Access Denied")]
    #[diagnostic(
        code(likeboost::admin::access_denied),
        help("you don't have permission to access this page")
    )]
    AccessDenied,

    #[error("no auto-like with id {0}")]
    #[diagnostic(code(likeboost::admin::unknown_auto_like))]
    UnknownAutoLike(SmolStr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),
}

/// Rejected form input, caught before anything is sent
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum FormError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Uid(#[from] EmptyUid),

    #[error("Please provide both email and password")]
    #[diagnostic(code(likeboost::form::credentials))]
    MissingCredentials,

    #[error("{field} must be a whole number, got {value:?}")]
    #[diagnostic(code(likeboost::form::number))]
    NotANumber { field: &'static str, value: String },

    #[error("current limits for {user_id} are unknown")]
    #[diagnostic(
        code(likeboost::form::limits_unknown),
        help("set both daily and extra requests")
    )]
    UnknownLimits { user_id: SmolStr },
}

/// Profile of the caller, provided it is an admin.
pub async fn require_admin<C: ApiClient>(client: &C) -> Result<Profile, AdminError> {
    match current_profile(client).await? {
        Some(profile) if profile.is_admin => Ok(profile),
        _ => Err(AdminError::AccessDenied),
    }
}

/// First run of an auto-like created at `now`: tomorrow, 05:00 UTC.
pub fn next_run_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Days::new(1);
    let run = NaiveTime::from_hms_opt(AUTO_LIKE_RUN_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    tomorrow.and_time(run).and_utc()
}

/// Input of the add-auto-like dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAutoLikeForm {
    pub uid: String,
}

impl NewAutoLikeForm {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    /// Insert request for this form, scheduled relative to `now`.
    pub fn to_insert(
        &self,
        created_by: &Profile,
        now: DateTime<Utc>,
    ) -> Result<InsertAutoLike, FormError> {
        Ok(InsertAutoLike::new()
            .uid(Uid::new(&self.uid)?)
            .next_run_at(next_run_at(now))
            .created_by(created_by.id.clone())
            .build())
    }
}

/// Auto-like schedule management.
pub struct AutoLikeAdmin<'a, C> {
    client: &'a C,
    admin: Profile,
    auto_likes: Vec<AutoLike>,
}

impl<'a, C: ApiClient> AutoLikeAdmin<'a, C> {
    /// Check access and load the schedule.
    pub async fn open(client: &'a C) -> Result<Self, AdminError> {
        let admin = require_admin(client).await?;
        let mut view = Self {
            client,
            admin,
            auto_likes: Vec::new(),
        };
        view.refresh().await?;
        Ok(view)
    }

    pub fn admin(&self) -> &Profile {
        &self.admin
    }

    /// Jobs as of the last fetch, newest first
    pub fn auto_likes(&self) -> &[AutoLike] {
        &self.auto_likes
    }

    pub async fn refresh(&mut self) -> Result<&[AutoLike], AdminError> {
        self.auto_likes = self
            .client
            .send(&ListAutoLikes::default())
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching auto likes"))?;
        Ok(&self.auto_likes)
    }

    /// Schedule a new job for the form's UID.
    pub async fn add(
        &mut self,
        form: &NewAutoLikeForm,
        now: DateTime<Utc>,
    ) -> Result<&[AutoLike], AdminError> {
        let insert = form.to_insert(&self.admin, now)?;
        self.client.send(&insert).await?.into_output()?;
        tracing::info!(uid = %insert.uid, next_run_at = %insert.next_run_at, "auto-like scheduled");
        self.refresh().await
    }

    /// Flip `is_active` on a job. Returns the new state.
    pub async fn toggle(&mut self, id: &str) -> Result<bool, AdminError> {
        let current = self
            .auto_likes
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.is_active)
            .ok_or_else(|| AdminError::UnknownAutoLike(id.into()))?;
        let request = SetAutoLikeActive {
            id: id.into(),
            is_active: !current,
        };
        self.client
            .send(&request)
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error toggling auto like"))?;
        self.refresh().await?;
        Ok(!current)
    }

    /// Delete a job. Nothing is sent unless `confirmed`.
    pub async fn delete(&mut self, id: &str, confirmed: bool) -> Result<bool, AdminError> {
        if !confirmed {
            return Ok(false);
        }
        self.client
            .send(&DeleteAutoLike { id: id.into() })
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error deleting auto like"))?;
        self.refresh().await?;
        Ok(true)
    }
}

/// Profile with its quota row, if the user has one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithLimits {
    pub profile: ProfileSummary,
    pub limits: Option<UserRequestLimit>,
}

impl UserWithLimits {
    pub fn email(&self) -> &str {
        self.profile.email.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    /// Newest first
    #[default]
    CreatedAt,
    /// Alphabetical
    Email,
}

/// Client-side search and ordering of the user list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub search: String,
    pub sort: UserSort,
}

impl UserQuery {
    pub fn apply<'u>(&self, users: &'u [UserWithLimits]) -> Vec<&'u UserWithLimits> {
        let needle = self.search.to_lowercase();
        let mut out: Vec<_> = users
            .iter()
            .filter(|u| needle.is_empty() || u.email().to_lowercase().contains(&needle))
            .collect();
        match self.sort {
            UserSort::Email => out.sort_by(|a, b| compare_emails(a.email(), b.email())),
            UserSort::CreatedAt => {
                out.sort_by(|a, b| b.profile.created_at.cmp(&a.profile.created_at))
            }
        }
        out
    }
}

fn compare_emails(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Input of the create-user dialog
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NewUserForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUserForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl NewUserForm {
    pub fn validate(&self) -> Result<CreateUser, FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(CreateUser {
            email: self.email.as_str().into(),
            password: self.password.as_str().into(),
        })
    }
}

/// Input of the edit-limits dialog, as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsForm {
    pub user_id: SmolStr,
    pub daily_requests: String,
    pub extra_requests: String,
}

impl LimitsForm {
    /// Prefilled with the user's current values, or the defaults.
    pub fn for_user(user: &UserWithLimits) -> Self {
        let (daily, extra) = user
            .limits
            .as_ref()
            .map(|l| (l.allowance.daily_requests, l.allowance.extra_requests))
            .unwrap_or((i64::from(DEFAULT_DAILY_REQUESTS), 0));
        Self {
            user_id: user.profile.id.clone(),
            daily_requests: daily.to_string(),
            extra_requests: extra.to_string(),
        }
    }

    /// Form for a partial edit: omitted fields keep the user's current
    /// values. Refused when those values could not be loaded, since the
    /// defaults would overwrite whatever the backend holds.
    pub fn override_for(
        user: &UserWithLimits,
        daily: Option<String>,
        extra: Option<String>,
    ) -> Result<Self, FormError> {
        if user.limits.is_none() && (daily.is_none() || extra.is_none()) {
            return Err(FormError::UnknownLimits {
                user_id: user.profile.id.clone(),
            });
        }
        let mut form = Self::for_user(user);
        if let Some(daily) = daily {
            form.daily_requests = daily;
        }
        if let Some(extra) = extra {
            form.extra_requests = extra;
        }
        Ok(form)
    }

    pub fn validate(&self) -> Result<UpdateRequestLimits, FormError> {
        Ok(UpdateRequestLimits::new()
            .user_id(self.user_id.clone())
            .daily_requests(parse_count("daily_requests", &self.daily_requests)?)
            .extra_requests(parse_count("extra_requests", &self.extra_requests)?)
            .build())
    }
}

fn parse_count(field: &'static str, value: &str) -> Result<i64, FormError> {
    value.trim().parse().map_err(|_| FormError::NotANumber {
        field,
        value: value.to_owned(),
    })
}

/// User list and quota overrides.
pub struct UserAdmin<'a, C> {
    client: &'a C,
    admin: Profile,
    users: Vec<UserWithLimits>,
}

impl<'a, C: ApiClient> UserAdmin<'a, C> {
    /// Check access and load the user list.
    pub async fn open(client: &'a C) -> Result<Self, AdminError> {
        let admin = require_admin(client).await?;
        let mut view = Self {
            client,
            admin,
            users: Vec::new(),
        };
        view.refresh().await?;
        Ok(view)
    }

    pub fn admin(&self) -> &Profile {
        &self.admin
    }

    /// Users as of the last fetch, newest first
    pub fn users(&self) -> &[UserWithLimits] {
        &self.users
    }

    pub fn find(&self, user_id: &str) -> Option<&UserWithLimits> {
        self.users.iter().find(|u| u.profile.id == user_id)
    }

    /// Reload profiles, then every user's limits row concurrently.
    ///
    /// A user whose limits cannot be read is listed without them.
    pub async fn refresh(&mut self) -> Result<&[UserWithLimits], AdminError> {
        let profiles = self
            .client
            .send(&ListProfiles::default())
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching users"))?;

        let requests: Vec<GetRequestLimits> = profiles
            .iter()
            .map(|p| GetRequestLimits::new(&p.id))
            .collect();
        let client = self.client;
        let limits = join_all(requests.iter().map(|request| async move {
            match client.send(request).await.and_then(|r| r.into_output()) {
                Ok(rows) => rows.into_iter().next(),
                Err(e) => {
                    tracing::warn!(user_id = %request.user_id, error = %e, "Error fetching user limits");
                    None
                }
            }
        }))
        .await;

        self.users = profiles
            .into_iter()
            .zip(limits)
            .map(|(profile, limits)| UserWithLimits { profile, limits })
            .collect();
        Ok(&self.users)
    }

    /// Create an account through the privileged function, then reload.
    pub async fn create_user(&mut self, form: &NewUserForm) -> Result<CreateUserOutput, AdminError> {
        let request = form.validate()?;
        let out = self
            .client
            .send(&request)
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error creating user"))?;
        tracing::info!(email = %request.email, "user created");
        self.refresh().await?;
        Ok(out)
    }

    /// Override a user's base and bonus allowance, then reload.
    pub async fn update_limits(&mut self, form: &LimitsForm) -> Result<(), AdminError> {
        let request = form.validate()?;
        self.client
            .send(&request)
            .await?
            .into_output()
            .inspect_err(|e| tracing::error!(error = %e, "Error updating user limits"))?;
        self.refresh().await?;
        Ok(())
    }
}
