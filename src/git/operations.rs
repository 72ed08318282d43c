//! libgit2-backed repository operations

use super::{GitBackend, PullStatus};
use crate::{GithubbyError, Result};
use anyhow::Context;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks, Repository, ResetType,
    SubmoduleUpdateOptions,
};
use std::fs;
use std::path::Path;

/// Submodules nested deeper than this are left uninitialized
pub const MAX_SUBMODULE_DEPTH: usize = 10;

/// libgit2 asks again after each rejected credential; give up after this many
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Git credentials configuration
#[derive(Debug, Clone, Default)]
pub struct GitCredentials {
    /// Personal access token, used for HTTPS remotes
    pub token: Option<String>,

    /// Username sent alongside the token
    pub username: Option<String>,
}

impl GitCredentials {
    /// Credentials that authenticate HTTPS with `token` and SSH through the agent
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token,
            username: Some("x-access-token".to_string()),
        }
    }

    /// Create callbacks for git2 authentication and transfer logging
    fn create_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0;

        callbacks.credentials(move |url, username_from_url, allowed_types| {
            attempts += 1;
            tracing::debug!(url, attempt = attempts, "Git credentials callback invoked");

            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str(&format!(
                    "authentication failed for {}",
                    url
                )));
            }

            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Some(username) = username_from_url {
                    return Cred::ssh_key_from_agent(username);
                }
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(ref token) = self.token {
                    let user = self
                        .username
                        .as_deref()
                        .or(username_from_url)
                        .unwrap_or("git");
                    return Cred::userpass_plaintext(user, token);
                }
            }

            Cred::default()
        });

        callbacks.transfer_progress(|stats| {
            if stats.total_objects() > 0 && stats.received_objects() == stats.total_objects() {
                tracing::trace!(
                    indexed = stats.indexed_deltas(),
                    total = stats.total_deltas(),
                    "Resolving deltas"
                );
            } else if stats.total_objects() > 0 {
                tracing::trace!(
                    received = stats.received_objects(),
                    total = stats.total_objects(),
                    "Receiving objects"
                );
            }
            true
        });

        callbacks
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.create_callbacks());
        fetch_options
    }
}

/// [`GitBackend`] implemented with libgit2
#[derive(Debug, Clone)]
pub struct Git2Backend {
    credentials: GitCredentials,
    max_submodule_depth: usize,
}

impl Default for Git2Backend {
    fn default() -> Self {
        Self::new(GitCredentials::default())
    }
}

impl Git2Backend {
    pub fn new(credentials: GitCredentials) -> Self {
        Self {
            credentials,
            max_submodule_depth: MAX_SUBMODULE_DEPTH,
        }
    }

    /// Initialize and update every submodule, recursing up to the depth limit
    fn update_submodules(&self, repo: &Repository, depth: usize) -> Result<()> {
        if depth >= self.max_submodule_depth {
            tracing::debug!(depth, "Submodule depth limit reached");
            return Ok(());
        }

        for mut submodule in repo.submodules()? {
            let name = submodule.name().unwrap_or("<unnamed>").to_string();
            tracing::debug!(submodule = %name, depth, "Updating submodule");

            let mut options = SubmoduleUpdateOptions::new();
            options.fetch(self.credentials.fetch_options());
            submodule.update(true, Some(&mut options))?;

            let nested = submodule.open()?;
            self.update_submodules(&nested, depth + 1)?;
        }

        Ok(())
    }
}

impl GitBackend for Git2Backend {
    type Repo = Repository;

    fn open(&self, path: &Path) -> Result<Repository> {
        Repository::open(path).map_err(|e| {
            GithubbyError::Git(format!(
                "Failed to open repository at {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn clone_repository(&self, url: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create backup directory {}", parent.display())
            })?;
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.credentials.fetch_options());

        let repo = builder.clone(url, path)?;
        self.update_submodules(&repo, 0)?;

        tracing::debug!(path = %path.display(), "Repository cloned successfully");
        Ok(())
    }

    fn working_tree<'r>(&self, repo: &'r Repository) -> Result<&'r Path> {
        repo.workdir().ok_or_else(|| {
            GithubbyError::Git(format!(
                "Repository at {} has no working tree",
                repo.path().display()
            ))
        })
    }

    fn reset(&self, repo: &Repository) -> Result<()> {
        let head = match repo.head() {
            Ok(head) => head.peel_to_commit()?,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                tracing::debug!("HEAD is unborn, nothing to reset");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut checkout = CheckoutBuilder::new();
        checkout.force();

        repo.reset(head.as_object(), ResetType::Hard, Some(&mut checkout))?;
        Ok(())
    }

    fn pull(&self, repo: &Repository) -> Result<PullStatus> {
        // HEAD stays symbolic even while the branch is unborn (empty repository)
        let head_ref = repo.find_reference("HEAD")?;
        let branch_ref = head_ref
            .symbolic_target()
            .ok_or_else(|| {
                GithubbyError::Git(
                    "HEAD is detached, cannot determine the branch to pull".to_string(),
                )
            })?
            .to_string();
        let branch = branch_ref
            .strip_prefix("refs/heads/")
            .ok_or_else(|| GithubbyError::Git(format!("HEAD points at {}", branch_ref)))?
            .to_string();

        let local = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?.id()),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        let mut remote = repo.find_remote("origin")?;
        let mut fetch_options = self.credentials.fetch_options();
        remote.fetch(&[] as &[&str], Some(&mut fetch_options), None)?;

        let upstream_ref = format!("refs/remotes/origin/{}", branch);
        let upstream = match repo.find_reference(&upstream_ref) {
            Ok(reference) => reference.peel_to_commit()?.id(),
            Err(e) if e.code() == ErrorCode::NotFound && local.is_none() => {
                tracing::debug!(branch = %branch, "Remote is still empty");
                return Ok(PullStatus::AlreadyUpToDate);
            }
            Err(e) => return Err(e.into()),
        };

        if Some(upstream) == local {
            return Ok(PullStatus::AlreadyUpToDate);
        }

        repo.reference(
            &branch_ref,
            upstream,
            true,
            &format!("githubby: force pull from {}", upstream_ref),
        )?;
        repo.set_head(&branch_ref)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.checkout_head(Some(&mut checkout))?;

        self.update_submodules(repo, 0)?;

        tracing::debug!(branch = %branch, from = ?local, to = %upstream, "Pulled updates");
        Ok(PullStatus::Updated)
    }
}
