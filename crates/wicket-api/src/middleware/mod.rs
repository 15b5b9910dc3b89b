//! API Middleware
//!
//! Middleware layers for authentication, authorization, and request logging.

pub mod auth;
pub mod logging;

pub use auth::{require_auth, AuthUser};
pub use logging::log_requests;
