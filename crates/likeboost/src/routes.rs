//! Path-to-view routing.

use std::fmt;
use std::str::FromStr;

/// Top-level views reachable by path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Request form and quota
    #[default]
    Home,
    /// Combined manual/automated history
    History,
    /// Automated history only
    AutoLikeHistory,
    /// Auto-like schedule (admins)
    Admin,
    /// User list and quotas (admins)
    UserManagement,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::History,
        Route::AutoLikeHistory,
        Route::Admin,
        Route::UserManagement,
    ];

    /// Resolve a path. Anything unrecognised lands on [`Route::Home`].
    ///
    /// Query strings, fragments and a trailing slash are ignored.
    pub fn from_path(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        match path {
            "/history" => Self::History,
            "/auto-like-history" => Self::AutoLikeHistory,
            "/admin" | "/admin-dashboard" => Self::Admin,
            "/user-management" => Self::UserManagement,
            _ => Self::Home,
        }
    }

    /// Canonical path
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::History => "/history",
            Self::AutoLikeHistory => "/auto-like-history",
            Self::Admin => "/admin",
            Self::UserManagement => "/user-management",
        }
    }

    /// Whether the view refuses non-admin sessions.
    pub const fn requires_admin(self) -> bool {
        matches!(self, Self::Admin | Self::UserManagement)
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_path(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
