// src/client/loopback/mod.rs
// Loopback client: interop service double joined to the client-side codec

pub mod schema;
pub mod service;

use super::codec::{Codec, TemporalForm};
use super::{ClientError, OperationCall, Response, SoapClient};
use crate::schema::SchemaRegistry;
use async_trait::async_trait;
use service::InteropService;
use std::sync::Arc;
use tracing::debug;

/// Test double: a `SoapClient` that serves calls from an in-process interop
/// service instead of the network.
///
/// Requests travel as full SOAP envelopes in both directions. The client
/// side writes temporal values in whole seconds, reproducing the
/// sub-second loss of the reference client stack.
pub struct LoopbackClient {
    schema: Arc<SchemaRegistry>,
    service: InteropService,
}

impl LoopbackClient {
    pub fn new() -> Self {
        let schema = Arc::new(schema::interop_schema());
        Self {
            service: InteropService::new(schema.clone()),
            schema,
        }
    }
}

impl Default for LoopbackClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SoapClient for LoopbackClient {
    fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    async fn call(&self, call: &OperationCall) -> Result<Response, ClientError> {
        let op = self
            .schema
            .operation(&call.operation)
            .ok_or_else(|| ClientError::Protocol(format!("no operation named '{}' in the WSDL", call.operation)))?;

        let codec = Codec::new(&self.schema, TemporalForm::Seconds);
        let request = codec.request_for(op, call)?;
        debug!(operation = %op.name, bytes = request.len(), "Loopback request");

        let response = self.service.handle(&request);
        debug!(operation = %op.name, bytes = response.len(), "Loopback response");

        codec.response_from(op, &response)
    }
}
