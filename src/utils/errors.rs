//! Error handling for Baropot
//!
//! This module defines the main error type used throughout the application
//! and how it is rendered as an HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the Baropot backend
#[derive(Error, Debug)]
pub enum BaropotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for Baropot operations
pub type Result<T> = std::result::Result<T, BaropotError>;

impl BaropotError {
    pub fn validation(message: impl Into<String>) -> Self {
        BaropotError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        BaropotError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        BaropotError::Forbidden(message.into())
    }

    pub fn not_found(resource: &'static str, id: i64) -> Self {
        BaropotError::NotFound { resource, id }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BaropotError::Database(_) => ErrorSeverity::Critical,
            BaropotError::Migration(_) => ErrorSeverity::Critical,
            BaropotError::Config(_) => ErrorSeverity::Critical,
            BaropotError::Forbidden(_) => ErrorSeverity::Warning,
            BaropotError::Unauthorized(_) => ErrorSeverity::Warning,
            BaropotError::Jwt(_) => ErrorSeverity::Warning,
            BaropotError::Validation(_) => ErrorSeverity::Info,
            BaropotError::Conflict(_) => ErrorSeverity::Info,
            BaropotError::NotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BaropotError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            BaropotError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            BaropotError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            BaropotError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            BaropotError::Unauthorized(_) | BaropotError::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            BaropotError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for BaropotError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Infrastructure details stay in the log
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, severity = %self.severity(), "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, "Request rejected");
            match &self {
                BaropotError::Validation(m)
                | BaropotError::Conflict(m)
                | BaropotError::Forbidden(m)
                | BaropotError::Unauthorized(m)
                | BaropotError::ServiceUnavailable(m) => m.clone(),
                other => other.to_string(),
            }
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BaropotError::validation("bad").status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(BaropotError::conflict("dup").status_and_code().0, StatusCode::CONFLICT);
        assert_eq!(BaropotError::not_found("Baropot", 1).status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(BaropotError::forbidden("host only").status_and_code().0, StatusCode::FORBIDDEN);
        assert_eq!(
            BaropotError::Unauthorized("missing token".into()).status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BaropotError::Config("x".into()).status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = BaropotError::not_found("Restaurant", 42);
        assert_eq!(err.to_string(), "Restaurant not found: 42");
    }

    #[test]
    fn test_severity() {
        assert_eq!(BaropotError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(BaropotError::conflict("x").severity(), ErrorSeverity::Info);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let response = BaropotError::Config("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_conflict_body() {
        let response = BaropotError::conflict("capacity exceeded").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["message"], "capacity exceeded");
    }
}
