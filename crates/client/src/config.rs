use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Versioned backend base URL, e.g. `https://crm.example.com/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the persisted bearer token
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Fixed key the token is stored under
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from(".crm-session")
}
fn default_token_key() -> String {
    "authToken".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Defaults embedded so that a missing `config/default.toml` still yields a
/// usable configuration.
const EMBEDDED_DEFAULTS: &str = r#"
    [api]
    base_url = "http://localhost:8000/api/v1"
    timeout_ms = 10000

    [session]
    storage_dir = ".crm-session"
    token_key = "authToken"

    [logging]
    level = "info"
    format = "pretty"
"#;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. embedded defaults
    /// 2. config/default.toml (optional)
    /// 3. config/local.toml - local overrides (optional, not in git)
    /// 4. Environment variables with CRM__ prefix (a `.env` file is read first)
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from_str(
                EMBEDDED_DEFAULTS,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CRM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Uses only the embedded defaults and `overrides`; no files, no environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            EMBEDDED_DEFAULTS,
            config::FileFormat::Toml,
        ));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CRM__API__BASE_URL must be set".to_string(),
            ));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "api.base_url must be an http(s) URL, got {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "api.timeout_ms cannot be 0".to_string(),
            ));
        }

        if self.session.token_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "session.token_key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.session.token_key, "authToken");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("api.base_url", "https://crm.example.com/api/v1"),
            ("api.timeout_ms", "2500"),
            ("logging.format", "json"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.api.base_url, "https://crm.example.com/api/v1");
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_config_validation_empty_base_url() {
        let config = Config::load_for_test(&[("api.base_url", "")]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("CRM__API__BASE_URL"));
    }

    #[test]
    fn test_config_validation_non_http_base_url() {
        let config = Config::load_for_test(&[("api.base_url", "ftp://example.com")])
            .expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config =
            Config::load_for_test(&[("api.timeout_ms", "0")]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_config_validation_empty_token_key() {
        let config =
            Config::load_for_test(&[("session.token_key", " ")]).expect("Failed to load config");
        assert!(config.validate().is_err());
    }
}
