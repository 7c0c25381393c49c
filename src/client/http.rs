// src/client/http.rs
// SOAP 1.1 over HTTP against a live service

use super::codec::{Codec, TemporalForm};
use super::{ClientError, OperationCall, Response, SoapClient};
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::schema::SchemaRegistry;
use crate::wsdl;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// `SoapClient` that POSTs envelopes to the service endpoint.
///
/// The schema is read from the service's WSDL once, when the client is
/// built. Every `call` is one HTTP request with no retries.
pub struct HttpClient {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    schema: SchemaRegistry,
}

impl HttpClient {
    /// Load the published schema from `{endpoint}?wsdl` and bind to the endpoint
    pub async fn connect(http: reqwest::Client, config: &HarnessConfig) -> Result<Self> {
        let schema = wsdl::load_schema(&http, &config.wsdl_url()).await?;
        Ok(Self::with_schema(http, &config.endpoint, schema, config.request_timeout))
    }

    /// Bind to an endpoint with an already known schema
    pub fn with_schema(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        schema: SchemaRegistry,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            request_timeout,
            schema,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SoapClient for HttpClient {
    fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    async fn call(&self, call: &OperationCall) -> std::result::Result<Response, ClientError> {
        let op = self
            .schema
            .operation(&call.operation)
            .ok_or_else(|| ClientError::Protocol(format!("no operation named '{}' in the WSDL", call.operation)))?;

        let codec = Codec::new(&self.schema, TemporalForm::Full);
        let request = codec.request_for(op, call)?;
        debug!(operation = %op.name, endpoint = %self.endpoint, bytes = request.len(), "SOAP request");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", format!("\"{}\"", op.name))
            .timeout(self.request_timeout)
            .body(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        debug!(operation = %op.name, %status, bytes = text.len(), "SOAP response");

        // SOAP 1.1 faults arrive with status 500
        if !status.is_success() && status != StatusCode::INTERNAL_SERVER_ERROR {
            return Err(ClientError::Transport(format!("HTTP {} from {}", status, self.endpoint)));
        }
        match codec.response_from(op, &text) {
            Err(ClientError::MalformedResponse(reason)) if !status.is_success() => {
                Err(ClientError::Transport(format!("HTTP {} without a SOAP fault: {}", status, reason)))
            }
            other => other,
        }
    }
}
