// src/config/mod.rs
// Layered harness configuration: defaults, config file, environment

pub mod env;
pub mod file;

pub use env::EnvConfig;
pub use file::FileConfig;

use crate::builder::DEFAULT_MAX_DEPTH;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9754/";
const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PARALLEL: usize = 4;

/// Resolved configuration for one harness run
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Service endpoint; the WSDL is served at `{endpoint}?wsdl`
    pub endpoint: String,
    /// Command that starts the service when the endpoint does not answer
    pub server_command: Option<String>,
    pub startup_timeout: Duration,
    pub request_timeout: Duration,
    pub max_depth: usize,
    pub strict_temporal: bool,
    pub max_parallel: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            server_command: None,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_depth: DEFAULT_MAX_DEPTH,
            strict_temporal: false,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

impl HarnessConfig {
    /// Load defaults, then the config file (explicit path or the default
    /// location), then environment overrides
    pub fn load(config_path: Option<&Path>) -> Self {
        let file = match config_path {
            Some(path) => FileConfig::load_from(path),
            None => FileConfig::load(),
        };
        let config = Self::layered(&file, &EnvConfig::load());
        info!(endpoint = %config.endpoint, strict_temporal = config.strict_temporal, "Configuration loaded");
        config
    }

    /// Apply the file layer, then the environment layer, over defaults
    pub fn layered(file: &FileConfig, env: &EnvConfig) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = &file.server.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(command) = &file.server.command {
            config.server_command = Some(command.clone());
        }
        if let Some(secs) = file.server.startup_timeout_secs {
            config.startup_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.server.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(depth) = file.run.max_depth {
            config.max_depth = depth;
        }
        if let Some(strict) = file.run.strict_temporal {
            config.strict_temporal = strict;
        }
        if let Some(max_parallel) = file.run.max_parallel {
            config.max_parallel = max_parallel;
        }

        if let Some(endpoint) = &env.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(command) = &env.server_command {
            config.server_command = Some(command.clone());
        }
        if let Some(secs) = env.startup_timeout_secs {
            config.startup_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(depth) = env.max_depth {
            config.max_depth = depth;
        }
        if let Some(strict) = env.strict_temporal {
            config.strict_temporal = strict;
        }

        config
    }

    /// URL the WSDL is published at
    pub fn wsdl_url(&self) -> String {
        let base = self.endpoint.split('?').next().unwrap_or(&self.endpoint);
        format!("{}?wsdl", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use file::{RunSection, ServerSection};

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::layered(&FileConfig::default(), &EnvConfig::default());
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.wsdl_url(), "http://localhost:9754/?wsdl");
    }

    #[test]
    fn test_environment_wins_over_file() {
        let file = FileConfig {
            server: ServerSection {
                endpoint: Some("http://file:1/".into()),
                startup_timeout_secs: Some(5),
                ..Default::default()
            },
            run: RunSection {
                strict_temporal: Some(true),
                ..Default::default()
            },
        };
        let env = EnvConfig {
            endpoint: Some("http://env:2/".into()),
            strict_temporal: Some(false),
            ..Default::default()
        };
        let config = HarnessConfig::layered(&file, &env);
        assert_eq!(config.endpoint, "http://env:2/");
        assert_eq!(config.startup_timeout, Duration::from_secs(5));
        assert!(!config.strict_temporal);
    }

    #[test]
    fn test_wsdl_url_replaces_query() {
        let config = HarnessConfig {
            endpoint: "http://host/svc?wsdl".into(),
            ..Default::default()
        };
        assert_eq!(config.wsdl_url(), "http://host/svc?wsdl");
    }
}
