//! Githubby configuration file handling
//!
//! Loads and manages the ~/.config/githubby/config.yaml file.

use crate::github::{CloneProtocol, DEFAULT_API_URL};
use crate::pagination::{EmptyPolicy, MAX_PAGE_SIZE};
use crate::{GithubbyError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transport retry settings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Githubby configuration
///
/// Every field is optional in the file. CLI flags take precedence over the
/// values loaded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubbyConfig {
    /// GitHub REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Root directory that backups are written under
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Transport used to clone repositories
    #[serde(default)]
    pub clone_protocol: CloneProtocol,

    /// Items requested per listing page (1..=100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// What an empty listing means
    #[serde(default)]
    pub empty_results: EmptyPolicy,

    /// Simulated duration of a mutating operation in dry-run mode
    #[serde(default = "default_dry_run_delay_ms")]
    pub dry_run_delay_ms: u64,

    #[serde(default)]
    pub retry: RetrySettings,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_dry_run_delay_ms() -> u64 {
    250
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl GithubbyConfig {
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            output_directory: default_output_directory(),
            clone_protocol: CloneProtocol::default(),
            page_size: default_page_size(),
            empty_results: EmptyPolicy::default(),
            dry_run_delay_ms: default_dry_run_delay_ms(),
            retry: RetrySettings::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Load from the default path, falling back to defaults when it is absent
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(GithubbyError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading githubby configuration");

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = if content.trim().is_empty() {
            Self::new()
        } else {
            serde_yaml::from_str(&content)?
        };

        tracing::debug!(
            api_url = %config.api_url,
            protocol = %config.clone_protocol,
            page_size = config.page_size,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        tracing::info!(path = %path.display(), "Saving githubby configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get the default config path (~/.config/githubby/config.yaml)
    pub fn default_path() -> PathBuf {
        // ~/.config on every platform, not the macOS Application Support dir
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("githubby");
        path.push("config.yaml");
        path
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dry_run_delay(&self) -> Duration {
        Duration::from_millis(self.dry_run_delay_ms)
    }
}

impl Default for GithubbyConfig {
    fn default() -> Self {
        Self::new()
    }
}
