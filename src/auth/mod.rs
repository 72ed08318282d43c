//! GitHub token resolution
//!
//! The same token authenticates REST calls and HTTPS git transfers. Sources,
//! in order: an explicit `--token`, the `GITHUB_TOKEN` environment variable,
//! then `gh auth token` from the GitHub CLI.

use std::process::Command;

/// Environment variable consulted when no token is passed explicitly
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Where a resolved token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Explicit,
    Environment,
    GhCli,
}

/// Resolve a token from all known sources
pub fn resolve_token(explicit: Option<&str>) -> Option<(String, TokenSource)> {
    resolve_token_with(explicit, std::env::var(TOKEN_ENV_VAR).ok(), gh_auth_token)
}

/// Resolution with injectable environment and `gh` lookups
fn resolve_token_with(
    explicit: Option<&str>,
    env_value: Option<String>,
    gh: impl FnOnce() -> Option<String>,
) -> Option<(String, TokenSource)> {
    if let Some(token) = non_empty(explicit.map(str::to_string)) {
        return Some((token, TokenSource::Explicit));
    }

    if let Some(token) = non_empty(env_value) {
        return Some((token, TokenSource::Environment));
    }

    if let Some(token) = non_empty(gh()) {
        tracing::debug!("Using token from `gh auth token`");
        return Some((token, TokenSource::GhCli));
    }

    None
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ask the GitHub CLI for its stored token
fn gh_auth_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_wins() {
        let resolved = resolve_token_with(
            Some("explicit"),
            Some("from-env".to_string()),
            || panic!("gh should not be consulted"),
        );
        assert_eq!(
            resolved,
            Some(("explicit".to_string(), TokenSource::Explicit))
        );
    }

    #[test]
    fn test_env_then_gh_fallback() {
        let resolved = resolve_token_with(None, Some(" env-token\n".to_string()), || None);
        assert_eq!(
            resolved,
            Some(("env-token".to_string(), TokenSource::Environment))
        );

        let resolved = resolve_token_with(Some(""), None, || Some("gho_abc".to_string()));
        assert_eq!(resolved, Some(("gho_abc".to_string(), TokenSource::GhCli)));
    }

    #[test]
    fn test_no_token_anywhere() {
        assert_eq!(resolve_token_with(None, Some(String::new()), || None), None);
    }
}
