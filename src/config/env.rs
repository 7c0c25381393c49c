// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use tracing::{debug, warn};

pub const ENDPOINT_VAR: &str = "SOAP_INTEROP_ENDPOINT";
pub const SERVER_COMMAND_VAR: &str = "SOAP_INTEROP_SERVER_COMMAND";
pub const STARTUP_TIMEOUT_VAR: &str = "SOAP_INTEROP_STARTUP_TIMEOUT_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "SOAP_INTEROP_REQUEST_TIMEOUT_SECS";
pub const MAX_DEPTH_VAR: &str = "SOAP_INTEROP_MAX_DEPTH";
pub const STRICT_TEMPORAL_VAR: &str = "SOAP_INTEROP_STRICT_TEMPORAL";

/// Overrides read from the environment; unset or invalid values are `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub endpoint: Option<String>,
    pub server_command: Option<String>,
    pub startup_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_depth: Option<usize>,
    pub strict_temporal: Option<bool>,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let config = Self {
            endpoint: read(ENDPOINT_VAR),
            server_command: read(SERVER_COMMAND_VAR),
            startup_timeout_secs: read(STARTUP_TIMEOUT_VAR).and_then(|v| parse_number(STARTUP_TIMEOUT_VAR, &v)),
            request_timeout_secs: read(REQUEST_TIMEOUT_VAR).and_then(|v| parse_number(REQUEST_TIMEOUT_VAR, &v)),
            max_depth: read(MAX_DEPTH_VAR).and_then(|v| parse_number(MAX_DEPTH_VAR, &v)),
            strict_temporal: read(STRICT_TEMPORAL_VAR).and_then(|v| parse_bool(STRICT_TEMPORAL_VAR, &v)),
        };
        if config != Self::default() {
            debug!(?config, "Environment overrides loaded");
        }
        config
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(variable = name, value, "Invalid number, using default");
            None
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(variable = name, value, "Invalid boolean, using default");
            None
        }
    }
}
