//! Baropot backend
//!
//! Restaurant discovery and group dining. This library provides the modules
//! for restaurants, bookmarks, reviews and reservations, baropot (group dining
//! event) organization with host-approved participation, a social feed,
//! coupons and live notifications.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BaropotError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::{build_router, AppState};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
