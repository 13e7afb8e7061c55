//! Configuration management for specbridge

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Default functions for serde
fn default_discovery_url() -> String {
    "https://openapisearch.com/api/specs".to_string()
}

fn default_catalog_url() -> String {
    "https://openapisearch.com/api/catalog.txt".to_string()
}

fn default_converter_url() -> String {
    "https://converter.swagger.io/api/convert".to_string()
}

fn default_detail_base_url() -> String {
    "https://openapisearch.com/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_conversion_timeout() -> u64 {
    10
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream collaborator configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Upstream services the spec pipeline talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Discovery service mapping short identifiers to spec URLs
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,
    /// Plain-text catalog of known identifiers, appended to tool descriptions
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// Swagger 2.0 to OpenAPI 3.x converter endpoint
    #[serde(default = "default_converter_url")]
    pub converter_url: String,
    /// Base of the per-operation pointer URLs printed in overviews
    #[serde(default = "default_detail_base_url")]
    pub detail_base_url: String,
    /// Timeout for discovery, spec and catalog fetches (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Bounded wait on the Swagger converter (seconds)
    #[serde(default = "default_conversion_timeout")]
    pub conversion_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json, text)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            timeout: 30,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            discovery_url: default_discovery_url(),
            catalog_url: default_catalog_url(),
            converter_url: default_converter_url(),
            detail_base_url: default_detail_base_url(),
            request_timeout_secs: default_request_timeout(),
            conversion_timeout_secs: default_conversion_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(BridgeError::config("Server host cannot be empty"));
        }

        if !self.host.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == ':' || c == '-') {
            return Err(BridgeError::config(format!(
                "Invalid host format: '{}'. Host must contain only alphanumeric characters, dots, colons, and hyphens",
                self.host
            )));
        }

        if self.port == 0 {
            return Err(BridgeError::config("Server port cannot be 0"));
        }

        if self.timeout == 0 {
            return Err(BridgeError::config("Server timeout cannot be 0"));
        }

        Ok(())
    }
}

impl UpstreamConfig {
    /// Validate upstream configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("discovery_url", &self.discovery_url),
            ("catalog_url", &self.catalog_url),
            ("converter_url", &self.converter_url),
            ("detail_base_url", &self.detail_base_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|e| {
                BridgeError::config(format!("Invalid upstream.{}: '{}': {}", name, value, e))
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(BridgeError::config(format!(
                    "upstream.{} must be an http(s) URL, got '{}'",
                    name, value
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(BridgeError::config("upstream.request_timeout_secs cannot be 0"));
        }

        if self.conversion_timeout_secs == 0 {
            return Err(BridgeError::config("upstream.conversion_timeout_secs cannot be 0"));
        }

        Ok(())
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(BridgeError::config(format!(
                "Invalid log level: '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            )));
        }

        match self.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(BridgeError::config(format!(
                "Invalid log format: '{}'. Must be 'text' or 'json'",
                other
            ))),
        }
    }
}

impl Config {
    /// Load .env files in order of precedence
    fn load_env_files() {
        let env = std::env::var("SPECBRIDGE_ENV")
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let env_specific_file = format!(".env.{}", env);
        let env_files = [".env", env_specific_file.as_str(), ".env.local"];

        for env_file in env_files {
            match dotenvy::from_filename(env_file) {
                Ok(_) => {
                    tracing::info!("Loaded environment variables from {}", env_file);
                }
                Err(e) if e.not_found() => {
                    tracing::debug!("No {} file found, skipping", env_file);
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", env_file, e);
                }
            }
        }
    }

    /// Load configuration from file with environment variables and CLI overrides
    pub fn load<P: AsRef<Path>>(
        path: P,
        host_override: Option<String>,
        port_override: Option<u16>,
    ) -> Result<Self> {
        Self::load_env_files();

        let mut config = Self::from_file(path)?;

        // Precedence: .env < file < env < CLI
        config.apply_environment_overrides()?;

        if let Some(host) = host_override {
            config.server.host = host;
        }
        if let Some(port) = port_override {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Read a YAML configuration file, falling back to defaults when it does not exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            tracing::warn!("Config file {:?} not found, using defaults", path.as_ref());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| BridgeError::config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| BridgeError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Some(host) = non_empty_env("SPECBRIDGE_HOST") {
            self.server.host = host;
        }

        if let Some(port) = non_empty_env("SPECBRIDGE_PORT") {
            self.server.port = port.parse().map_err(|e| {
                BridgeError::config(format!("Invalid SPECBRIDGE_PORT environment variable: {}", e))
            })?;
        }

        if let Some(url) = non_empty_env("SPECBRIDGE_DISCOVERY_URL") {
            self.upstream.discovery_url = url;
        }

        if let Some(url) = non_empty_env("SPECBRIDGE_CATALOG_URL") {
            self.upstream.catalog_url = url;
        }

        if let Some(url) = non_empty_env("SPECBRIDGE_CONVERTER_URL") {
            self.upstream.converter_url = url;
        }

        if let Some(url) = non_empty_env("SPECBRIDGE_DETAIL_BASE_URL") {
            self.upstream.detail_base_url = url;
        }

        if let Some(timeout) = non_empty_env("SPECBRIDGE_REQUEST_TIMEOUT") {
            self.upstream.request_timeout_secs = timeout.parse().map_err(|e| {
                BridgeError::config(format!("Invalid SPECBRIDGE_REQUEST_TIMEOUT environment variable: {}", e))
            })?;
        }

        if let Some(timeout) = non_empty_env("SPECBRIDGE_CONVERSION_TIMEOUT") {
            self.upstream.conversion_timeout_secs = timeout.parse().map_err(|e| {
                BridgeError::config(format!("Invalid SPECBRIDGE_CONVERSION_TIMEOUT environment variable: {}", e))
            })?;
        }

        if let Some(level) = non_empty_env("SPECBRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = non_empty_env("SPECBRIDGE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.upstream.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
