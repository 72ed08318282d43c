//! Configuration system
//!
//! Loads ~/.config/githubby/config.yaml with settings for:
//! - The GitHub API endpoint and request behavior
//! - Where and how repositories are backed up
//! - Dry-run pacing

mod githubby_config;
pub mod validation;

pub use githubby_config::{GithubbyConfig, RetrySettings};
pub use validation::{validate_config, validate_config_result, ValidationError};
