// src/invoker.rs
// Operation Invoker - one remote call per invocation, outcome tagged

use crate::client::{ClientError, OperationCall, SoapClient};
use crate::error::{HarnessError, Result};
use crate::fault::{FaultKind, classify};
use crate::utils::millis;
use crate::value::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        result: Option<Value>,
        headers: Vec<Value>,
    },
    /// An expected fault kind (validation, application, malformed response)
    Fault {
        kind: FaultKind,
        code: Option<String>,
        message: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            Outcome::Fault { kind, .. } => Some(*kind),
            Outcome::Success { .. } => None,
        }
    }
}

pub struct OperationInvoker {
    client: Arc<dyn SoapClient>,
}

impl OperationInvoker {
    pub fn new(client: Arc<dyn SoapClient>) -> Self {
        Self { client }
    }

    /// Perform exactly one call; no retries.
    ///
    /// Transport failures and unrecognised client errors are returned as
    /// `HarnessError::Client` unchanged.
    pub async fn invoke(&self, call: &OperationCall) -> Result<Outcome> {
        if self.client.schema().operation(&call.operation).is_none() {
            return Err(HarnessError::UnknownOperation(call.operation.clone()));
        }

        let start = Instant::now();
        let result = self.client.call(call).await;
        let elapsed_ms = millis(start.elapsed());

        match result {
            Ok(response) => {
                debug!(operation = %call.operation, elapsed_ms, "Call succeeded");
                Ok(Outcome::Success {
                    result: response.body,
                    headers: response.headers,
                })
            }
            Err(error) => {
                let kind = classify(&error);
                if !kind.is_expected() {
                    warn!(operation = %call.operation, kind = %kind, error = %error, "Unexpected client error");
                    return Err(HarnessError::Client(error));
                }
                debug!(operation = %call.operation, kind = %kind, elapsed_ms, "Call faulted");
                let (code, message) = match error {
                    ClientError::Fault { code, message, .. } => (Some(code), message),
                    other => (None, other.to_string()),
                };
                Ok(Outcome::Fault { kind, code, message })
            }
        }
    }
}
