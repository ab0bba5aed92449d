//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{BaropotError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;
    validate_search_config(&settings.search)?;
    validate_scheduler_config(&settings.scheduler)?;

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(BaropotError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(BaropotError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(BaropotError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(BaropotError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(BaropotError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate token verification configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(BaropotError::Config(
            "JWT secret is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(BaropotError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(BaropotError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate near-me search bounds
fn validate_search_config(config: &super::SearchConfig) -> Result<()> {
    if config.min_radius_km <= 0.0 || config.min_radius_km > config.max_radius_km {
        return Err(BaropotError::Config(
            "Search radius bounds must satisfy 0 < min <= max".to_string()
        ));
    }

    if config.default_radius_km < config.min_radius_km || config.default_radius_km > config.max_radius_km {
        return Err(BaropotError::Config(
            "Default search radius must lie within the radius bounds".to_string()
        ));
    }

    Ok(())
}

/// Validate background job configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    if config.reservation_sweep_interval_secs == 0 {
        return Err(BaropotError::Config(
            "Reservation sweep interval must be greater than 0".to_string()
        ));
    }

    if config.reservation_grace_minutes < 0 {
        return Err(BaropotError::Config(
            "Reservation grace period cannot be negative".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "test-secret".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_rejected() {
        let settings = Settings::default();
        assert_matches!(validate_settings(&settings), Err(BaropotError::Config(_)));
    }

    #[test]
    fn test_min_connections_above_max_rejected() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(BaropotError::Config(_)));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(BaropotError::Config(_)));
    }

    #[test]
    fn test_default_radius_outside_bounds_rejected() {
        let mut settings = valid_settings();
        settings.search.default_radius_km = 80.0;
        assert_matches!(validate_settings(&settings), Err(BaropotError::Config(_)));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let mut settings = valid_settings();
        settings.scheduler.reservation_sweep_interval_secs = 0;
        assert_matches!(validate_settings(&settings), Err(BaropotError::Config(_)));
    }
}
