//! Server configuration for the graduation predictor.
//!
//! Configuration can be built in code through [`ServerConfig::builder`] or read
//! from a JSON file with [`ServerConfig::from_json_file`]; missing keys fall
//! back to the defaults.

use crate::labels::LabelMapping;
use crate::model_loader::DEFAULT_MODEL_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the prediction form server.
///
/// # Example
///
/// ```
/// use graduation_serving::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .host("0.0.0.0")
///     .port(8080)
///     .model_path("/srv/models/model_graduation.json")
///     .build();
/// assert_eq!(config.socket_addr(), "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to (default: "127.0.0.1")
    pub host: String,

    /// Port to listen on (default: 8501)
    pub port: u16,

    /// Path to the model artifact (default: "model_graduation.json")
    pub model_path: PathBuf,

    /// Class-code to label table for the deployed model
    pub labels: LabelMapping,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels: LabelMapping::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read a configuration file in JSON format.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {}", path.display(), e)))
    }

    /// Get the socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        self.labels
            .validate()
            .map_err(|e| ConfigError::InvalidLabels(e.to_string()))?;
        Ok(())
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    model_path: Option<PathBuf>,
    labels: Option<LabelMapping>,
}

impl ServerConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            host: Some(config.host),
            port: Some(config.port),
            model_path: Some(config.model_path),
            labels: Some(config.labels),
        }
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port number.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the model artifact path.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set the label mapping.
    pub fn labels(mut self, labels: LabelMapping) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerConfig {
        let default = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(default.host),
            port: self.port.unwrap_or(default.port),
            model_path: self.model_path.unwrap_or(default.model_path),
            labels: self.labels.unwrap_or(default.labels),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid port number
    #[error("Invalid port number: port cannot be 0")]
    InvalidPort,

    /// Empty host
    #[error("Invalid host: host cannot be empty")]
    InvalidHost,

    /// Empty model path
    #[error("Model path cannot be empty")]
    EmptyModelPath,

    /// Invalid label mapping
    #[error("Invalid label mapping: {0}")]
    InvalidLabels(String),

    /// Invalid configuration file
    #[error("Invalid configuration file: {0}")]
    InvalidConfigFile(String),
}
