//! Typed endpoint definitions and entity models for the likeboost backend.
//!
//! Every remote contract the client uses is a plain struct implementing
//! [`likeboost_common::rest::Endpoint`]:
//!
//! - [`auth`]: password sign-in, token refresh, sign-out
//! - [`functions`]: like delivery and admin user creation
//! - [`rpc`]: paginated history listings
//! - [`tables`]: reads and writes on `profiles`, `user_request_limits`, `auto_likes`
//!
//! Row shapes live in [`models`].

pub mod auth;
pub mod functions;
pub mod models;
pub mod rpc;
pub mod tables;
