//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files overlaid with `CRUDHUB__*` environment variables.

pub mod crud;
pub mod flash;
pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};

use self::crud::CrudConfig;
use self::flash::FlashConfig;
use self::logging::LoggingConfig;
use self::server::ServerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// CRUD controller defaults.
    #[serde(default)]
    pub crud: CrudConfig,
    /// Flash message store limits.
    #[serde(default)]
    pub flash: FlashConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay
    /// `config/<env>` and environment variables prefixed with `CRUDHUB__`.
    /// Every file is optional; missing sections fall back to defaults.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CRUDHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.crud.per_page, 10);
        assert_eq!(config.crud.max_per_page, 100);
        assert_eq!(config.crud.route_pattern, "%s_%s");
        assert_eq!(config.crud.role_pattern, "role_%s_%s");
        assert!(config.crud.template_pattern.is_none());
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.flash.max_sessions, 10000);
        assert_eq!(config.flash.time_to_idle_seconds, 1800);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"crud": {"per_page": 25}}"#).expect("deserialize");
        assert_eq!(config.crud.per_page, 25);
        assert_eq!(config.crud.role_pattern, "role_%s_%s");
        assert_eq!(config.logging.level, "info");
    }
}
