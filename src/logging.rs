//! Logging configuration using tracing
//!
//! Structured logging to stderr with support for the RUST_LOG environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when RUST_LOG is unset and `--verbose` is off
const QUIET_FILTER: &str = "warn";

/// Filter used when RUST_LOG is unset and `--verbose` is on
const VERBOSE_FILTER: &str = "warn,githubby=debug";

/// Initialize the tracing subscriber
///
/// RUST_LOG always wins over the `verbose` flag.
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - Show info and above
/// - `RUST_LOG=githubby=trace` - Trace level for githubby, including git transfer progress
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init(verbose: bool) -> crate::Result<()> {
    let default_filter = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .map_err(|e| crate::GithubbyError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init(true);
}
