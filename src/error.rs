// src/error.rs
// Standardized error types for the interop harness

use crate::client::ClientError;
use crate::equivalence::Mismatch;
use thiserror::Error;

/// Main error type for the harness library
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("schema resolution failed for {name}: {reason}")]
    SchemaResolution { name: String, reason: String },

    #[error("fixture does not match {type_name}: {reason}")]
    FixtureMismatch { type_name: String, reason: String },

    #[error("value nesting exceeds {limit} levels at {path}")]
    NestingTooDeep { limit: usize, path: String },

    #[error("operation not published by the service: {0}")]
    UnknownOperation(String),

    #[error("unexpected client error: {0}")]
    Client(#[from] ClientError),

    #[error("round-trip mismatch:\n{0}")]
    Equivalence(#[from] Mismatch),

    #[error("expectation not met: {0}")]
    Expectation(String),

    #[error("WSDL error: {0}")]
    Wsdl(String),

    #[error("server startup failed: {0}")]
    ServerStartup(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Result using HarnessError
pub type Result<T> = std::result::Result<T, HarnessError>;

impl HarnessError {
    pub fn fixture(type_name: impl ToString, reason: impl Into<String>) -> Self {
        HarnessError::FixtureMismatch {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn resolution(name: impl ToString, reason: impl Into<String>) -> Self {
        HarnessError::SchemaResolution {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors that point at the harness or its fixtures rather than the
    /// system under test
    pub fn is_harness_bug(&self) -> bool {
        matches!(
            self,
            HarnessError::FixtureMismatch { .. } | HarnessError::NestingTooDeep { .. }
        )
    }
}
