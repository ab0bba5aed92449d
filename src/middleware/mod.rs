//! Middleware module
//!
//! This module contains extractors and layers for request processing

pub mod auth;
pub mod logging;

// Re-export commonly used middleware
pub use auth::{AuthUser, OptionalAuthUser};
pub use logging::log_requests;
