// src/server.rs
// Service lifecycle: reuse a running server or start one and wait for its WSDL

use crate::client::HttpClient;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::http::{answers, create_shared_client};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Delay between readiness polls
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A service the harness can talk to.
///
/// When the harness started the process it owns the child and kills it on
/// shutdown (or drop).
pub struct ManagedServer {
    pub wsdl_url: String,
    child: Option<Child>,
}

impl ManagedServer {
    /// True when this run started the process
    pub fn is_spawned(&self) -> bool {
        self.child.is_some()
    }

    /// Stop a spawned server; a reused one is left alone
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            info!(wsdl = %self.wsdl_url, "Stopping interop server");
            child.kill().await?;
        }
        Ok(())
    }
}

/// Reuse a server already answering at the WSDL URL, otherwise start the
/// configured command and poll until the WSDL is served
pub async fn ensure_running(http: &reqwest::Client, config: &HarnessConfig) -> Result<ManagedServer> {
    let wsdl_url = config.wsdl_url();

    if answers(http, &wsdl_url).await {
        info!(wsdl = %wsdl_url, "Reusing running interop server");
        return Ok(ManagedServer { wsdl_url, child: None });
    }

    let command = config.server_command.as_deref().ok_or_else(|| {
        HarnessError::ServerStartup(format!(
            "nothing answers at {} and no server command is configured",
            wsdl_url
        ))
    })?;

    info!(command, wsdl = %wsdl_url, "Starting interop server");
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HarnessError::ServerStartup(format!("failed to spawn '{}': {}", command, e)))?;

    let deadline = Instant::now() + config.startup_timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Err(HarnessError::ServerStartup(format!(
                "server exited with {} before serving {}",
                status, wsdl_url
            )));
        }
        if answers(http, &wsdl_url).await {
            info!(wsdl = %wsdl_url, "Interop server is up");
            return Ok(ManagedServer {
                wsdl_url,
                child: Some(child),
            });
        }
        if Instant::now() >= deadline {
            warn!(wsdl = %wsdl_url, "Interop server did not come up in time");
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Failed to kill server process");
            }
            return Err(HarnessError::ServerStartup(format!(
                "{} not served within {:?}",
                wsdl_url, config.startup_timeout
            )));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Bring the service up once for a run and build a client from its WSDL.
///
/// A spawned server is stopped again when the schema cannot be loaded.
pub async fn connect(config: &HarnessConfig) -> Result<(ManagedServer, HttpClient)> {
    let http = create_shared_client(config.request_timeout);
    let server = ensure_running(&http, config).await?;
    match HttpClient::connect(http, config).await {
        Ok(client) => Ok((server, client)),
        Err(e) => {
            if let Err(stop) = server.shutdown().await {
                debug!(error = %stop, "Failed to stop server after schema load failure");
            }
            Err(e)
        }
    }
}
