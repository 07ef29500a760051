use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::credential_pool::mask_key;

// Import logging macros
use crate::{log_system_event, log_validation};

/// Models tried in priority order when none are configured.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro",
    "gemini-1.0-pro",
    "gemini-2.0-flash",
];

/// Wait between key attempts for the same model.
pub const DEFAULT_BACKOFF_SECS: u64 = 60;

/// Failures that make the generation configuration unusable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("no API keys configured")]
    NoApiKeys,

    #[error("no generation models configured")]
    NoModels,

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Complete application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Text-generation boundary configuration: keys, models and backoff policy
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_keys: Vec<String>,
    pub models: Vec<String>,
    pub base_url: Option<String>,
    pub backoff: Duration,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        log_system_event!(config, "Loading application configuration from environment variables");

        let config = Config {
            database: DatabaseConfig::from_env()?,
            generation: GenerationConfig::from_env()?,
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            database_url = %self.database.url,
            api_keys = ?self.generation.api_keys.iter().map(|k| mask_key(k)).collect::<Vec<_>>(),
            models = ?self.generation.models,
            backoff_secs = self.generation.backoff.as_secs(),
            server_address = %format!("{}:{}", self.server.host, self.server.port),
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(anyhow!("DATABASE_URL must start with 'sqlite:'"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.generation.models.is_empty() {
            return Err(ConfigError::NoModels.into());
        }

        if self.generation.api_keys.is_empty() {
            warn!("No generation API keys configured - quizzes will be unavailable and essays scored offline");
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.to_lowercase().as_str()) {
            warn!("Log level '{}' is a filter directive, passing it through to the subscriber", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:ielts_practice.db?mode=rwc".to_string());

        Ok(DatabaseConfig { url })
    }
}

impl GenerationConfig {
    fn from_env() -> Result<Self> {
        let mut api_keys = env::var("GEMINI_API_KEYS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        // Single-key fallback
        if api_keys.is_empty() {
            if let Ok(key) = env::var("GEMINI_API_KEY") {
                api_keys = split_list(&key);
            }
        }

        let models = env::var("GEMINI_MODELS")
            .map(|raw| split_list(&raw))
            .ok()
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        let base_url = env::var("GEMINI_BASE_URL").ok();

        let backoff_str = env::var("GENERATION_BACKOFF_SECS")
            .unwrap_or_else(|_| DEFAULT_BACKOFF_SECS.to_string());
        let backoff_secs = backoff_str.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            name: "GENERATION_BACKOFF_SECS",
            value: backoff_str.clone(),
        })?;

        Ok(GenerationConfig {
            api_keys,
            models,
            base_url,
            backoff: Duration::from_secs(backoff_secs),
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let port_str = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string());

        let port = port_str.parse::<u16>()
            .map_err(|_| anyhow!("Invalid PORT value: '{}'. Must be a number between 1-65535", port_str))?;

        let host = env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(ServerConfig { port, host })
    }
}

impl LoggingConfig {
    /// Read on its own at startup so the subscriber exists before the rest
    /// of the configuration is loaded and logged.
    pub fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,ielts_practice=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY")
            .unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

/// Split a comma-separated list, dropping blanks but keeping order and duplicates.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            generation: GenerationConfig {
                api_keys: vec!["key-one".to_string()],
                models: vec!["gemini-2.0-flash".to_string()],
                base_url: None,
                backoff: Duration::from_secs(60),
            },
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_enabled: false,
                console_enabled: true,
                log_directory: "logs".to_string(),
            },
        }
    }

    #[test]
    fn test_split_list_keeps_order_and_duplicates() {
        assert_eq!(split_list("a, b,,a ,"), vec!["a", "b", "a"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_default_models_order() {
        assert_eq!(DEFAULT_MODELS.len(), 4);
        assert_eq!(DEFAULT_MODELS[0], "gemini-1.5-flash-latest");
        assert_eq!(DEFAULT_MODELS[3], "gemini-2.0-flash");
    }

    #[test]
    fn test_config_validation() {
        let config = sample_config();
        assert!(config.validate().is_ok());

        let mut invalid_port = config.clone();
        invalid_port.server.port = 0;
        assert!(invalid_port.validate().is_err());

        let mut no_models = config.clone();
        no_models.generation.models.clear();
        assert!(no_models.validate().is_err());

        let mut bad_db = config.clone();
        bad_db.database.url = "postgres://localhost/db".to_string();
        assert!(bad_db.validate().is_err());
    }

    #[test]
    fn test_missing_keys_is_not_fatal() {
        let mut config = sample_config();
        config.generation.api_keys.clear();
        assert!(config.validate().is_ok());
    }
}
