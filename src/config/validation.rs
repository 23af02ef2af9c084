//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the loader handles parsing)
//! - Reject empty mandatory secrets
//! - Validate value ranges (timeouts > 0, port != 0)
//! - Reject empty CORS allow-lists
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::time::Duration;

use crate::config::schema::{AllowedOrigins, AppConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Environment variable the problem relates to.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::new("PORT", "must be between 1 and 65535"));
    }

    if config.secrets.jwt_secret.is_empty() {
        errors.push(ValidationError::new("JWT_SECRET", "must not be empty"));
    }
    if config.secrets.database_url.is_empty() {
        errors.push(ValidationError::new("DATABASE_URL", "must not be empty"));
    }

    if config.timeouts.request == Duration::ZERO {
        errors.push(ValidationError::new("REQUEST_TIMEOUT_MS", "must be greater than zero"));
    }
    if config.timeouts.shutdown_grace == Duration::ZERO {
        errors.push(ValidationError::new("SHUTDOWN_GRACE_MS", "must be greater than zero"));
    }

    if matches!(&config.cors.allowed_origins, AllowedOrigins::List(origins) if origins.is_empty()) {
        errors.push(ValidationError::new("CORS_ALLOWED_ORIGINS", "must list at least one origin"));
    }
    if config.cors.allowed_methods.is_empty() {
        errors.push(ValidationError::new("CORS_ALLOWED_METHODS", "must list at least one method"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
