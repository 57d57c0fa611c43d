//! # likeboost
//!
//! Client for the likeboost backend: request likes for a game account,
//! watch the daily quota, browse request history and, for admins, manage
//! scheduled auto-likes and per-user limits.
//!
//! Every view here is a plain struct that owns its state and is driven
//! through an [`ApiClient`](client::ApiClient), normally a
//! [`CredentialSession`](client::CredentialSession).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use likeboost::client::{CredentialSession, FileAuthStore};
//! use likeboost::config::DemoConfig;
//! use likeboost::orchestrator::RequestOrchestrator;
//! use likeboost::quota::QuotaTracker;
//! # use miette::IntoDiagnostic;
//!
//! # #[tokio::main]
//! # async fn main() -> miette::Result<()> {
//! let url = url::Url::parse("https://project.supabase.co").into_diagnostic()?;
//! let session = Arc::new(CredentialSession::new(
//!     Arc::new(FileAuthStore::new("session.json")),
//!     Arc::new(reqwest::Client::new()),
//!     url,
//!     "anon-key",
//! ));
//! session.login("me@example.com", "hunter2", None).await?;
//!
//! let orchestrator = RequestOrchestrator::new(session.clone(), DemoConfig::default());
//! let mut quota = QuotaTracker::new(orchestrator.subscribe());
//! let remaining = quota.sync(&*session).await;
//! let outcome = orchestrator.submit("123456789", remaining).await?;
//! println!("{}", likeboost::display::outcome(&outcome));
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod client;
pub mod config;
pub mod display;
pub mod history;
pub mod orchestrator;
pub mod quota;
/// Path-to-view routing
pub mod routes;

pub use likeboost_api as api;
pub use likeboost_common as common;
