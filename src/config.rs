//! Configuration management for `vizcast`
//!
//! Handles loading configuration from files and environment variables and
//! validates it before anything is started.

use crate::VizcastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable read when no API key is configured
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VizcastConfig {
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// Model artifact locations
    pub models: ModelsConfig,
    /// HTTP hosting settings
    pub server: ServerConfig,
    /// Route definition
    pub route: RouteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// weerlive API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for the provider
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding the artifacts
    #[serde(default = "default_models_directory")]
    pub directory: String,
    #[serde(default = "default_vvn_file")]
    pub vvn_file: String,
    #[serde(default = "default_vvx_file")]
    pub vvx_file: String,
    #[serde(default = "default_cloud_base_file")]
    pub cloud_base_file: String,
}

/// HTTP hosting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served for non-API paths (map page, scripts)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Route definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteConfig {
    /// JSON waypoint file replacing the built-in reference route
    #[serde(default)]
    pub waypoints_path: Option<String>,
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

// Default value functions
fn default_weather_base_url() -> String {
    "https://weerlive.nl/api/weerlive_api_v2.php".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_models_directory() -> String {
    "models".to_string()
}

fn default_vvn_file() -> String {
    "best_vvn_model.json".to_string()
}

fn default_vvx_file() -> String {
    "best_vvx_model.json".to_string()
}

fn default_cloud_base_file() -> String {
    "best_wolkenbasis_model.json".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            directory: default_models_directory(),
            vvn_file: default_vvn_file(),
            vvx_file: default_vvx_file(),
            cloud_base_file: default_cloud_base_file(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
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

impl VizcastConfig {
    /// Load configuration from `config_path` (default `vizcast.toml`) and the
    /// environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("vizcast.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // VIZCAST_WEATHER__API_KEY, VIZCAST_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("VIZCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: VizcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.weather.api_key.is_none() {
            config.weather.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.models.directory.is_empty() {
            self.models.directory = default_models_directory();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the provider credentials
    pub fn validate_api_key(&self) -> Result<()> {
        let Some(api_key) = &self.weather.api_key else {
            return Err(VizcastError::config(format!(
                "Weather API key is missing. Set weather.api_key or {API_KEY_ENV}."
            ))
            .into());
        };

        if api_key.trim().is_empty() {
            return Err(VizcastError::config("Weather API key cannot be empty").into());
        }

        if api_key.len() > 100 {
            return Err(VizcastError::config(
                "Weather API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                VizcastError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.port == 0 {
            return Err(VizcastError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(VizcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(VizcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(VizcastError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
