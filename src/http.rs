// src/http.rs
// Shared HTTP client for WSDL retrieval and endpoint polling

use crate::error::Result;
use std::time::Duration;
use tracing::debug;

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a single readiness poll
pub const POLL_TIMEOUT: Duration = Duration::from_secs(2);

/// Create the shared HTTP client.
///
/// Created once per run and passed to the probe and server manager.
pub fn create_shared_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// GET `url` and return the body; non-2xx statuses are errors
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(url, bytes = body.len(), "Fetched");
    Ok(body)
}

/// True when `url` answers with a success status within the poll timeout
pub async fn answers(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).timeout(POLL_TIMEOUT).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            debug!(url, error = %e, "Endpoint not answering");
            false
        }
    }
}
