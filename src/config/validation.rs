//! Configuration validation
//!
//! Checks a loaded configuration before any network or git work starts:
//! - The API URL is http(s)
//! - Page size is within the platform limit
//! - Retry backoff bounds are coherent

use super::githubby_config::GithubbyConfig;
use crate::pagination::MAX_PAGE_SIZE;
use crate::GithubbyError;

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a githubby configuration
pub fn validate_config(config: &GithubbyConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !config.api_url.starts_with("https://") && !config.api_url.starts_with("http://") {
        errors.push(ValidationError::new(
            "api_url",
            format!("Invalid API URL: {}", config.api_url),
        ));
    }

    if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
        errors.push(ValidationError::new(
            "page_size",
            format!(
                "Page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, config.page_size
            ),
        ));
    }

    if config.output_directory.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "output_directory",
            "Output directory cannot be empty",
        ));
    }

    if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
        errors.push(ValidationError::new(
            "retry.initial_backoff_ms",
            format!(
                "Initial backoff ({}ms) exceeds max backoff ({}ms)",
                config.retry.initial_backoff_ms, config.retry.max_backoff_ms
            ),
        ));
    }

    if config.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "request_timeout_secs",
            "Request timeout must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &GithubbyConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        GithubbyError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&GithubbyConfig::new()).is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = GithubbyConfig::new();
        config.page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "page_size");

        config.page_size = 101;
        assert!(validate_config(&config).is_err());

        config.page_size = 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_api_url() {
        let mut config = GithubbyConfig::new();
        config.api_url = "api.github.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("Invalid API URL"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GithubbyConfig::new();
        config.api_url = "ftp://example.com".to_string();
        config.output_directory = PathBuf::new();
        config.retry.initial_backoff_ms = 120_000;
        config.request_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "api_url",
                "output_directory",
                "retry.initial_backoff_ms",
                "request_timeout_secs"
            ]
        );
    }

    #[test]
    fn test_validate_config_result_message() {
        let mut config = GithubbyConfig::new();
        config.page_size = 500;
        let err = validate_config_result(&config).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }
}
