//! Application configuration schemas.
//!
//! Configuration is merged by the `config` crate from, in increasing
//! priority: a base TOML file, an environment overlay
//! (`config/<env>.toml`), `PRESENCE__*` environment variables, and finally
//! the deployment variables `DISCORD_TOKEN`, `PORT` and `ALLOWED_ORIGINS`.

pub mod app;
pub mod gateway;
pub mod logging;
pub mod normalizer;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig, parse_origin_list};
pub use self::gateway::GatewayConfig;
pub use self::logging::LoggingConfig;
pub use self::normalizer::NormalizerConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Streaming fan-out settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Presence normalization settings.
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values taken from the plain deployment environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `DISCORD_TOKEN`
    pub token: Option<String>,
    /// `PORT`
    pub port: Option<String>,
    /// `ALLOWED_ORIGINS`, comma separated.
    pub allowed_origins: Option<String>,
}

impl EnvOverrides {
    /// Reads the overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("DISCORD_TOKEN").ok(),
            port: std::env::var("PORT").ok(),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").ok(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, the `env` overlay, and the process environment.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        Self::load_with(path, env, EnvOverrides::from_env())
    }

    /// Load configuration with explicitly supplied deployment overrides.
    pub fn load_with(path: &str, env: &str, overrides: EnvOverrides) -> Result<Self, AppError> {
        let origins = overrides
            .allowed_origins
            .as_deref()
            .map(parse_origin_list);

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PRESENCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("gateway.token", overrides.token)?
            .set_override_option("server.port", overrides.port)?
            .set_override_option("server.cors.allowed_origins", origins)?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Checks the preconditions the server relies on at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.gateway.token.trim().is_empty() {
            return Err(AppError::configuration("DISCORD_TOKEN is missing"));
        }
        if self.realtime.subscriber_buffer_size == 0 || self.realtime.ingest_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime buffer sizes must be greater than zero",
            ));
        }
        Ok(())
    }
}
