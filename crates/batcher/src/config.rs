use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for one batch-transcoding run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Media root directory to scan for video files
    pub media_root: PathBuf,
    /// Maximum number of jobs attempted per run
    pub batch_limit: usize,
    /// Durable completion ledger (flat text, one path per line)
    pub ledger_path: PathBuf,
    /// Scratch directory for in-flight staging copies
    pub staging_dir: PathBuf,
    /// Directory where per-run logs are written
    pub run_log_dir: PathBuf,
    /// External transcoder executable
    pub transcoder_bin: PathBuf,
    /// Named encoding profile passed to the transcoder as its first argument
    pub transcode_profile: String,
    /// Optional wall-clock limit for a single transcoder invocation; a hung
    /// transcoder otherwise blocks the batch indefinitely
    pub transcode_timeout_secs: Option<u64>,
    /// Select and log jobs without staging, transcoding or committing
    pub dry_run: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl BatchConfig {
    /// Create a default configuration with sensible values
    pub fn default_config() -> Self {
        Self {
            media_root: PathBuf::from("/media"),
            batch_limit: 10,
            ledger_path: PathBuf::from("transcoded-paths.log"),
            staging_dir: PathBuf::from(".processing"),
            run_log_dir: PathBuf::from("run-logs"),
            transcoder_bin: PathBuf::from("handbrakecli"),
            transcode_profile: "Apple 1080p60 Surround".to_string(),
            transcode_timeout_secs: None,
            dry_run: false,
        }
    }

    /// Load configuration from a TOML or JSON file. A None path or a file
    /// that doesn't exist yields the defaults.
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_config()),
        };

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        // format picked by extension; anything not .toml is treated as JSON
        let config = match config_path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", config_path.display()))?,
        };

        Ok(config)
    }
}
