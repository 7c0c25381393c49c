// src/config/file.rs
// File-based configuration from ~/.soap-interop/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config file structure
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub run: RunSection,
}

/// `[server]`: where the service lives and how to start it
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ServerSection {
    pub endpoint: Option<String>,
    /// Shell command that starts the service when nothing answers
    pub command: Option<String>,
    pub startup_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// `[run]`: scenario execution knobs
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct RunSection {
    pub max_depth: Option<usize>,
    pub strict_temporal: Option<bool>,
    pub max_parallel: Option<usize>,
}

impl FileConfig {
    /// Load config from ~/.soap-interop/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path; missing or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".soap-interop")
            .join("config.toml")
    }
}
