// src/fault.rs
// Fault Classifier - maps raised client errors to fault kinds

use crate::client::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fault codes that name a schema validation failure on the server
const VALIDATION_CODES: &[&str] = &["Client.ValidationError", "SchemaValidationError"];

/// Category of a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Client- or server-side schema validation rejected a value
    Validation,
    /// The service raised a SOAP fault
    Application,
    /// The response did not conform to the published schema
    MalformedResponse,
    /// The request never completed
    Transport,
    /// Anything the harness did not anticipate
    Unexpected,
}

impl FaultKind {
    /// Kinds a scenario may legitimately expect
    pub fn is_expected(self) -> bool {
        matches!(
            self,
            FaultKind::Validation | FaultKind::Application | FaultKind::MalformedResponse
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultKind::Validation => "validation",
            FaultKind::Application => "application",
            FaultKind::MalformedResponse => "malformed_response",
            FaultKind::Transport => "transport",
            FaultKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a client error. Pure: the same error always maps to the same kind.
pub fn classify(error: &ClientError) -> FaultKind {
    match error {
        ClientError::Validation { .. } => FaultKind::Validation,
        ClientError::Fault { code, .. } if VALIDATION_CODES.iter().any(|c| code.contains(c)) => {
            FaultKind::Validation
        }
        ClientError::Fault { .. } => FaultKind::Application,
        ClientError::MalformedResponse(_) => FaultKind::MalformedResponse,
        ClientError::Transport(_) => FaultKind::Transport,
        ClientError::Protocol(_) => FaultKind::Unexpected,
    }
}
