//! Git operations for local working copies
//!
//! The sync engine talks to git through [`GitBackend`]; [`Git2Backend`] is the
//! libgit2 implementation with token and ssh-agent authentication.

mod operations;

pub use operations::{Git2Backend, GitCredentials, MAX_SUBMODULE_DEPTH};

use crate::Result;
use std::path::Path;

/// Result of a successful pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// The branch moved to a new upstream commit
    Updated,
    /// Upstream had nothing new; not an error
    AlreadyUpToDate,
}

/// Local git capabilities used by the sync engine
pub trait GitBackend {
    /// An opened working copy
    type Repo;

    /// Open `path` as an existing repository
    fn open(&self, path: &Path) -> Result<Self::Repo>;

    /// Clone `url` into `path`, recursing into submodules
    fn clone_repository(&self, url: &str, path: &Path) -> Result<()>;

    /// Working tree of an opened repository; fails for bare repositories
    fn working_tree<'r>(&self, repo: &'r Self::Repo) -> Result<&'r Path>;

    /// Hard-reset the working tree to HEAD, discarding local modifications
    fn reset(&self, repo: &Self::Repo) -> Result<()>;

    /// Fetch and force the current branch to its upstream
    fn pull(&self, repo: &Self::Repo) -> Result<PullStatus>;
}
