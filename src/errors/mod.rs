//! Error types surfaced through HTTP responses
//!
//! - `auth_error` - session token and sub-protocol authentication failures
//! - `app_error` - handler failures rendered as JSON error bodies

pub mod app_error;
pub mod auth_error;
