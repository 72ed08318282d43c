//! Clone-or-update state machine with a single nuke-and-retry recovery
//!
//! Each attempt first inspects the local path. A missing or unreadable
//! working copy is cloned; an existing one is reset to HEAD and force-pulled.
//! When retry is allowed, a failure deletes the directory and runs one fresh
//! attempt.
//! A second failure is reported as [`SyncOutcome::Failed`].

use crate::git::{GitBackend, PullStatus};
use crate::github::{CloneProtocol, RepositoryDescriptor};
use crate::{GithubbyError, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Upper bound on attempts per sync: the first try plus one retry
pub const MAX_ATTEMPTS: usize = 2;

/// Result of synchronizing one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    Updated,
    AlreadyUpToDate,
    Failed(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncOutcome::Failed(_))
    }

    /// Convert a failure into a reportable error for `repository`
    pub fn into_error(self, repository: &str) -> Option<GithubbyError> {
        match self {
            SyncOutcome::Failed(reason) => Some(GithubbyError::SyncFailure {
                repository: repository.to_string(),
                reason,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Cloned => write!(f, "cloned"),
            SyncOutcome::Updated => write!(f, "updated"),
            SyncOutcome::AlreadyUpToDate => write!(f, "already up to date"),
            SyncOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// State machine step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Clone,
    WorkingTree,
    Reset,
    Pull,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Clone => write!(f, "Cloning"),
            Step::WorkingTree => write!(f, "Getting state"),
            Step::Reset => write!(f, "Resetting state"),
            Step::Pull => write!(f, "Pulling changes"),
        }
    }
}

#[derive(Debug)]
struct StepFailure {
    step: Step,
    error: GithubbyError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.error)
    }
}

fn at(step: Step) -> impl FnOnce(GithubbyError) -> StepFailure {
    move |error| StepFailure { step, error }
}

/// Converges local working copies to their remote repositories
pub struct RepositorySyncEngine<B> {
    backend: B,
    protocol: CloneProtocol,
}

impl<B: GitBackend> RepositorySyncEngine<B> {
    pub fn new(backend: B, protocol: CloneProtocol) -> Self {
        Self { backend, protocol }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn protocol(&self) -> CloneProtocol {
        self.protocol
    }

    /// Bring `local_path` in line with `repository`
    ///
    /// With `allow_retry`, a failed attempt removes `local_path` and runs one
    /// more attempt from scratch. Never panics or returns early on git errors;
    /// they end up in [`SyncOutcome::Failed`].
    pub fn sync(
        &self,
        repository: &RepositoryDescriptor,
        local_path: &Path,
        allow_retry: bool,
    ) -> SyncOutcome {
        let url = repository.transport_url(self.protocol);
        let attempts = if allow_retry { MAX_ATTEMPTS } else { 1 };
        let mut last_failure = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                if let Err(e) = remove_working_copy(local_path) {
                    return SyncOutcome::Failed(format!(
                        "{} (and removing {} for retry failed: {})",
                        last_failure
                            .as_ref()
                            .map(StepFailure::to_string)
                            .unwrap_or_default(),
                        local_path.display(),
                        e
                    ));
                }
            }

            match self.converge(&repository.name, url, local_path) {
                Ok(outcome) => {
                    info!(
                        repository = %repository.full_name,
                        attempt,
                        outcome = %outcome,
                        "Repository synchronized"
                    );
                    return outcome;
                }
                Err(failure) => {
                    if attempt < attempts {
                        warn!(
                            repository = %repository.full_name,
                            path = %local_path.display(),
                            "{} (retrying from a fresh clone)",
                            failure
                        );
                    } else {
                        warn!(repository = %repository.full_name, "{}", failure);
                    }
                    last_failure = Some(failure);
                }
            }
        }

        SyncOutcome::Failed(
            last_failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no attempt was made".to_string()),
        )
    }

    /// One pass of inspect → clone | (working tree → reset → pull)
    fn converge(
        &self,
        name: &str,
        url: &str,
        local_path: &Path,
    ) -> std::result::Result<SyncOutcome, StepFailure> {
        debug!(repository = %name, "Checking if a local repository exists");

        let repo = match self.backend.open(local_path) {
            Ok(repo) => repo,
            Err(e) => {
                debug!(repository = %name, reason = %e, "No usable local repository, cloning");
                self.backend
                    .clone_repository(url, local_path)
                    .map_err(at(Step::Clone))?;
                return Ok(SyncOutcome::Cloned);
            }
        };

        debug!(repository = %name, "Getting state");
        self.backend
            .working_tree(&repo)
            .map_err(at(Step::WorkingTree))?;

        debug!(repository = %name, "Resetting state");
        self.backend.reset(&repo).map_err(at(Step::Reset))?;

        debug!(repository = %name, "Pulling changes");
        match self.backend.pull(&repo).map_err(at(Step::Pull))? {
            PullStatus::Updated => Ok(SyncOutcome::Updated),
            PullStatus::AlreadyUpToDate => Ok(SyncOutcome::AlreadyUpToDate),
        }
    }
}

/// Remove a working copy and everything under it; a missing path is fine
fn remove_working_copy(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed local working copy");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
