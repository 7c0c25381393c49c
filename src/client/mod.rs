// src/client/mod.rs
// SOAP client capability consumed by the harness

pub mod codec;
pub mod http;
pub mod loopback;
pub mod xml;

pub use http::HttpClient;
pub use loopback::LoopbackClient;

use crate::schema::SchemaRegistry;
use crate::value::Value;
use async_trait::async_trait;
use thiserror::Error;

/// One remote invocation: operation, optional argument, optional headers.
///
/// Built per scenario and consumed by a single call.
#[derive(Debug, Clone)]
pub struct OperationCall {
    pub operation: String,
    pub argument: Option<Value>,
    /// Out-of-band header values sent alongside the body
    pub headers: Vec<Value>,
}

impl OperationCall {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            argument: None,
            headers: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: Value) -> Self {
        self.argument = Some(argument);
        self
    }

    pub fn with_header(mut self, header: Value) -> Self {
        self.headers.push(header);
        self
    }
}

/// Decoded successful response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Body result, `None` for operations without output
    pub body: Option<Value>,
    /// Header values returned by the server
    pub headers: Vec<Value>,
}

/// Raw error surface of a SOAP client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The server answered with a SOAP fault
    #[error("SOAP fault {code}: {message}")]
    Fault {
        code: String,
        message: String,
        actor: Option<String>,
    },

    /// The client refused to send a value that violates the schema
    #[error("validation error at {path}: {message}")]
    Validation { path: String, message: String },

    /// The response did not conform to the published schema
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Connection or HTTP-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Envelope-level anomaly (not a SOAP message, unknown operation, ...)
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// What the harness needs from a SOAP client stack.
///
/// The schema is loaded once when the client is constructed (from the WSDL)
/// and is immutable afterwards. `call` performs exactly one request/response
/// exchange; header values ride along with that single call only.
#[async_trait]
pub trait SoapClient: Send + Sync {
    /// Schema registry parsed from the service's WSDL
    fn schema(&self) -> &SchemaRegistry;

    /// Invoke an operation by value
    async fn call(&self, call: &OperationCall) -> Result<Response, ClientError>;
}
