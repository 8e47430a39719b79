//! Error types for the estimator runtime
//!
//! Everything below the HTTP layer reports failures through [`EstimatorError`];
//! the web layer maps them onto responses in `api_errors`.

use thiserror::Error;

/// Main error type for the estimator
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Deserialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {artifact}: {message}")]
    InvalidArtifact { artifact: String, message: String },

    #[error("Model not found on server.")]
    ModelMissing,

    #[error("Model lacks feature info")]
    SchemaUnavailable,

    #[error("{message}")]
    Scaling { message: String },

    #[error("{message}")]
    Prediction { message: String },
}

/// Result alias used across the crate
pub type EstimatorResult<T> = Result<T, EstimatorError>;

impl EstimatorError {
    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a deserialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create a structural validation error for a loaded artifact
    pub fn invalid_artifact(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Create a scaling error
    pub fn scaling(message: impl Into<String>) -> Self {
        Self::Scaling {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::Prediction {
            message: message.into(),
        }
    }
}
