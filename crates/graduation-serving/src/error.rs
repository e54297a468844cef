//! Error types for the graduation-serving crate.
//!
//! Errors fall into two tiers. Startup errors (the artifact cannot be loaded,
//! the configuration is invalid) halt the process before the form is reachable.
//! Per-request errors (bad input, a failed inference call) are shown to the user
//! and leave the form usable.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for serving operations.
pub type ServingResult<T> = Result<T, ServingError>;

/// Errors that can occur while loading the model or serving predictions.
#[derive(Debug, Error)]
pub enum ServingError {
    /// The model artifact does not exist at the configured path.
    #[error("Model artifact not found at {0:?}. Make sure the model file is deployed next to the application")]
    ArtifactMissing(PathBuf),

    /// The model artifact exists but could not be deserialized or validated.
    #[error("Failed to load model artifact {path:?}: {reason}")]
    ArtifactCorrupt {
        /// Path of the offending artifact
        path: PathBuf,
        /// Underlying deserialization or validation message
        reason: String,
    },

    /// The artifact parsed but describes an unusable model.
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// The classes declared by the artifact differ from the configured label mapping.
    #[error("Model class encoding {found:?} does not match the configured label mapping {expected:?}")]
    ClassEncodingMismatch {
        /// Class codes the label mapping knows about
        expected: Vec<i64>,
        /// Class codes declared by the artifact
        found: Vec<i64>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Prediction failed.
    #[error("Prediction failed: {0}")]
    PredictionError(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServingError {
    /// Create an artifact-corrupt error.
    pub fn artifact_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-artifact error.
    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::InvalidArtifact(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }

    /// Create a prediction error.
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::PredictionError(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Check if this error must halt the process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ArtifactMissing(_)
                | Self::ArtifactCorrupt { .. }
                | Self::InvalidArtifact(_)
                | Self::ClassEncodingMismatch { .. }
                | Self::ConfigError(_)
                | Self::ServerError(_)
        )
    }

    /// Check if this is a client error (bad request).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

impl From<candle_core::Error> for ServingError {
    fn from(err: candle_core::Error) -> Self {
        ServingError::PredictionError(err.to_string())
    }
}
