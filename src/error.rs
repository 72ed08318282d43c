//! Error types for githubby
//!
//! One error enum covers listing, syncing, cleanup and the ambient
//! configuration/transport failures. Uses thiserror for ergonomic error handling.

use std::fmt;
use thiserror::Error;

/// Result type alias for githubby operations
pub type Result<T> = std::result::Result<T, GithubbyError>;

/// Which half of a release cleanup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStage {
    /// Deleting the release object
    Release,
    /// Deleting the tag reference after the release was removed
    Tag,
}

impl fmt::Display for CleanupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupStage::Release => write!(f, "release"),
            CleanupStage::Tag => write!(f, "tag"),
        }
    }
}

/// Error type for githubby operations
#[derive(Error, Debug)]
pub enum GithubbyError {
    /// A page of a remote listing could not be fetched
    #[error("Failed to fetch page {page} of {resource}: {source}")]
    Fetch {
        resource: String,
        page: u32,
        #[source]
        source: Box<GithubbyError>,
    },

    /// A remote listing completed without yielding anything
    #[error("No {0} found")]
    EmptyResult(String),

    /// Clone/update did not converge after the allowed retry
    #[error("Failed to sync {repository}: {reason}")]
    SyncFailure { repository: String, reason: String },

    /// Release or tag deletion failed
    #[error("Failed to delete {stage} for {tag}: {reason}")]
    CleanupFailure {
        tag: String,
        stage: CleanupStage,
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(String),

    /// Git2 library errors
    #[error("Git library error: {0}")]
    Git2(#[from] git2::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the GitHub API
    #[error("GitHub API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rate limited (with retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl crate::github::retry::RetryableError for GithubbyError {
    fn retry_decision(&self) -> crate::github::retry::RetryDecision {
        use crate::github::retry::RetryDecision;
        use std::time::Duration;

        match self {
            GithubbyError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else {
                    RetryDecision::Retry
                }
            }
            GithubbyError::Api { status, .. } => match status {
                500..=599 => RetryDecision::Retry,
                _ => RetryDecision::NoRetry,
            },
            GithubbyError::RateLimited(secs) => {
                RetryDecision::RetryAfter(Duration::from_secs(*secs))
            }
            GithubbyError::Fetch { .. }
            | GithubbyError::EmptyResult(_)
            | GithubbyError::SyncFailure { .. }
            | GithubbyError::CleanupFailure { .. }
            | GithubbyError::Config(_)
            | GithubbyError::Git(_)
            | GithubbyError::Git2(_)
            | GithubbyError::Io(_)
            | GithubbyError::Auth(_)
            | GithubbyError::Json(_)
            | GithubbyError::Yaml(_)
            | GithubbyError::Other(_)
            | GithubbyError::Anyhow(_) => RetryDecision::NoRetry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::retry::{RetryDecision, RetryableError};
    use std::time::Duration;

    #[test]
    fn test_fetch_error_names_resource_and_page() {
        let err = GithubbyError::Fetch {
            resource: "repositories of octocat".to_string(),
            page: 3,
            source: Box::new(GithubbyError::Api {
                status: 404,
                message: "Not Found".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("page 3"));
        assert!(msg.contains("repositories of octocat"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_cleanup_failure_mentions_stage() {
        let err = GithubbyError::CleanupFailure {
            tag: "v1.0.0".to_string(),
            stage: CleanupStage::Tag,
            reason: "Reference does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to delete tag for v1.0.0: Reference does not exist"
        );
    }

    #[test]
    fn test_retry_decisions() {
        assert_eq!(
            GithubbyError::RateLimited(5).retry_decision(),
            RetryDecision::RetryAfter(Duration::from_secs(5))
        );
        assert_eq!(
            GithubbyError::Api {
                status: 502,
                message: String::new()
            }
            .retry_decision(),
            RetryDecision::Retry
        );
        assert_eq!(
            GithubbyError::Api {
                status: 404,
                message: String::new()
            }
            .retry_decision(),
            RetryDecision::NoRetry
        );
        assert_eq!(
            GithubbyError::EmptyResult("releases".to_string()).retry_decision(),
            RetryDecision::NoRetry
        );
    }
}
