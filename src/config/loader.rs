//! Configuration loading from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::config::schema::{
    AllowedOrigins, AppConfig, CorsConfig, Environment, ListenerConfig, ObservabilityConfig,
    Secret, SecretsConfig, TimeoutConfig,
};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required variable {var}")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppConfig {
    /// Load and validate configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let defaults = ListenerConfig::default();
        let cors_defaults = CorsConfig::default();

        let config = AppConfig {
            listener: ListenerConfig {
                host: vars.get("HOST").unwrap_or(defaults.host),
                port: vars.parse("PORT")?.unwrap_or(defaults.port),
            },
            environment: vars.parse("APP_ENV")?.unwrap_or_default(),
            secrets: SecretsConfig {
                jwt_secret: Secret::new(vars.require("JWT_SECRET")?),
                database_url: Secret::new(vars.require("DATABASE_URL")?),
            },
            cors: CorsConfig {
                allowed_origins: match vars.list("CORS_ALLOWED_ORIGINS") {
                    Some(origins) if origins.iter().any(|o| o == "*") => AllowedOrigins::Any,
                    Some(origins) => AllowedOrigins::List(origins),
                    None => cors_defaults.allowed_origins,
                },
                allowed_methods: vars
                    .list("CORS_ALLOWED_METHODS")
                    .map(|methods| methods.into_iter().map(|m| m.to_ascii_uppercase()).collect())
                    .unwrap_or(cors_defaults.allowed_methods),
                allowed_headers: vars
                    .list("CORS_ALLOWED_HEADERS")
                    .unwrap_or(cors_defaults.allowed_headers),
            },
            timeouts: TimeoutConfig {
                request: vars
                    .parse::<u64>("REQUEST_TIMEOUT_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(TimeoutConfig::default().request),
                shutdown_grace: vars
                    .parse::<u64>("SHUTDOWN_GRACE_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(TimeoutConfig::default().shutdown_grace),
            },
            observability: ObservabilityConfig {
                log_level: vars.get("LOG_LEVEL"),
            },
        };

        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }
}

/// Lookup wrapper treating blank values as unset.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing { var: key })
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                    var: key,
                    reason: format!("'{raw}': {e}"),
                })
            })
            .transpose()
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}
