//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub scheduler: SchedulerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Access token verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    pub leeway_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Directory for the daily rolling log file; stdout only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

/// Near-me search defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub default_radius_km: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
}

/// Background job configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    pub reservation_sweep_interval_secs: u64,
    /// Minutes after the reserved time before a reservation counts as completed
    pub reservation_grace_minutes: i64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// The file defaults to `config.{toml,yaml,json}` in the working directory
    /// and may be moved with `BAROPOT_CONFIG_FILE`; it is optional.
    pub fn new() -> Result<Self, config::ConfigError> {
        let path = std::env::var("BAROPOT_CONFIG_FILE").unwrap_or_else(|_| "config".to_string());
        Self::load(config::File::with_name(&path).required(false))
    }

    /// Load settings from a required configuration file plus the environment
    pub fn from_file(path: &std::path::Path) -> Result<Self, config::ConfigError> {
        Self::load(config::File::from(path).required(true))
    }

    fn load<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("BAROPOT")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings from an explicit TOML document layered over the defaults
    pub fn from_toml_str(document: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BaropotError> {
        super::validation::validate_settings(self)
    }

    /// Socket address string the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/baropot".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                issuer: None,
                leeway_seconds: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
                directory: None,
            },
            search: SearchConfig {
                default_radius_km: 10.0,
                min_radius_km: 0.1,
                max_radius_km: 50.0,
            },
            scheduler: SchedulerConfig {
                reservation_sweep_interval_secs: 1800,
                reservation_grace_minutes: 30,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_new_without_config_file() {
        std::env::set_var("BAROPOT_CONFIG_FILE", "/nonexistent/baropot");
        let settings = Settings::new();
        std::env::remove_var("BAROPOT_CONFIG_FILE");

        let settings = settings.unwrap();
        assert!(settings.server.cors_origins.is_empty());
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.issuer, None);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        std::env::set_var("BAROPOT_CONFIG_FILE", "/nonexistent/baropot");
        std::env::set_var("BAROPOT_SERVER__CORS_ORIGINS", "http://a.example,http://b.example");
        std::env::set_var("BAROPOT_DATABASE__URL", "postgresql://env.example/baropot");
        let settings = Settings::new();
        for key in ["BAROPOT_CONFIG_FILE", "BAROPOT_SERVER__CORS_ORIGINS", "BAROPOT_DATABASE__URL"] {
            std::env::remove_var(key);
        }

        let settings = settings.unwrap();
        assert_eq!(settings.server.cors_origins, vec!["http://a.example", "http://b.example"]);
        assert_eq!(settings.database.url, "postgresql://env.example/baropot");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [server]
            port = 9090

            [auth]
            jwt_secret = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.auth.jwt_secret, "secret");
        assert_eq!(settings.scheduler.reservation_sweep_interval_secs, 1800);
    }

    #[test]
    #[serial]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baropot.toml");
        std::fs::write(
            &path,
            r#"
            [database]
            url = "postgresql://db.internal/baropot"

            [search]
            default_radius_km = 3.0
            "#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.database.url, "postgresql://db.internal/baropot");
        assert_eq!(settings.search.default_radius_km, 3.0);
        assert_eq!(settings.search.max_radius_km, 50.0);

        assert!(Settings::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_bind_address() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    }
}
