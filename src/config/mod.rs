//! Configuration management module
//!
//! Settings are layered: built-in defaults, an optional config file, then
//! `BAROPOT_*` environment variables. `validate` runs once at startup.

pub mod settings;
pub mod validation;

pub use settings::{Settings, ServerConfig, DatabaseConfig, AuthConfig, LoggingConfig, SearchConfig, SchedulerConfig};
