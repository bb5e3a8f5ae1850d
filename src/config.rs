//! Configuration management for the route advisor
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AdvisorError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the route advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Generative model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather `appid` credential
    pub api_key: Option<String>,
    /// Current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: Option<String>,
    /// Request timeout in seconds, 0 disables the timeout
    #[serde(default)]
    pub timeout_seconds: u32,
    /// Retries on transient failures, 0 sends exactly one request
    #[serde(default)]
    pub max_retries: u32,
}

/// Generative model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Bearer token for the chat completions API
    pub api_key: Option<String>,
    /// API root, `/chat/completions` is appended
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Model used for structured route analysis
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,
    /// Model used by the conversational assistant
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,
    /// Request timeout in seconds, 0 disables the timeout
    #[serde(default)]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request timeout for the HTTP API in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

// Default value functions
fn default_weather_base_url() -> Option<String> {
    Some("https://api.openweathermap.org/data/2.5/weather".to_string())
}

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_analysis_model() -> String {
    "gpt-4".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u32 {
    120
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: 0,
            max_retries: 0,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_model_base_url(),
            analysis_model: default_analysis_model(),
            chat_model: default_chat_model(),
            temperature: None,
            timeout_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ROUTE_ADVISOR_WEATHER__API_KEY, ROUTE_ADVISOR_MODEL__BASE_URL, ...
        builder = builder.add_source(
            Environment::with_prefix("ROUTE_ADVISOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AdvisorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_fallbacks(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("route-advisor").join("config.toml"))
    }

    /// Fill credentials from the conventional provider variables when the
    /// prefixed settings are absent
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if is_blank(self.weather.api_key.as_deref()) {
            if let Some(key) = lookup("OPENWEATHER_API_KEY") {
                self.weather.api_key = Some(key);
            }
        }
        if let Some(url) = lookup("OPENWEATHER_API_URL") {
            if is_blank(self.weather.base_url.as_deref())
                || self.weather.base_url == default_weather_base_url()
            {
                self.weather.base_url = Some(url);
            }
        }
        if is_blank(self.model.api_key.as_deref()) {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.model.api_key = Some(key);
            }
        }
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.analysis_model.is_empty() {
            self.model.analysis_model = default_analysis_model();
        }
        if self.model.chat_model.is_empty() {
            self.model.chat_model = default_chat_model();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings.
    ///
    /// Missing credentials are not rejected here; the clients report them
    /// when they are first used.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                AdvisorError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(AdvisorError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.model.timeout_seconds > 600 {
            return Err(AdvisorError::config("Model API timeout cannot exceed 600 seconds").into());
        }

        if let Some(temperature) = self.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AdvisorError::config(format!(
                    "Model temperature must be between 0 and 2, got: {temperature}"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AdvisorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AdvisorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if let Some(url) = self.weather.base_url.as_deref().filter(|u| !u.is_empty()) {
            if !is_http_url(url) {
                return Err(AdvisorError::config(
                    "Weather API base URL must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        if !is_http_url(&self.model.base_url) {
            return Err(
                AdvisorError::config("Model API base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(
            config.weather.base_url.as_deref(),
            Some("https://api.openweathermap.org/data/2.5/weather")
        );
        assert_eq!(config.weather.timeout_seconds, 0);
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(config.model.analysis_model, "gpt-4");
        assert_eq!(config.model.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AdvisorConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AdvisorConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_bad_url() {
        let mut config = AdvisorConfig::default();
        config.model.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        // blank weather URL is allowed here and reported when used
        let mut config = AdvisorConfig::default();
        config.weather.base_url = Some(String::new());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_fallbacks() {
        let vars = HashMap::from([
            ("OPENWEATHER_API_KEY", "weather-key"),
            ("OPENWEATHER_API_URL", "http://localhost:9000/weather"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        let mut config = AdvisorConfig::default();
        config.apply_env_fallbacks(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.weather.api_key.as_deref(), Some("weather-key"));
        assert_eq!(
            config.weather.base_url.as_deref(),
            Some("http://localhost:9000/weather")
        );
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_env_fallbacks_do_not_override_explicit_values() {
        let vars = HashMap::from([("OPENAI_API_KEY", "sk-env")]);
        let mut config = AdvisorConfig::default();
        config.model.api_key = Some("sk-file".to_string());
        config.apply_env_fallbacks(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.model.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("route-advisor-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[weather]
api_key = "abc12345"
max_retries = 2

[model]
analysis_model = "gpt-4o"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = AdvisorConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.model.analysis_model, "gpt-4o");
        assert_eq!(config.model.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.logging.format, "json");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AdvisorConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("route-advisor"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
