//! Githubby - GitHub account backup and release housekeeping
//!
//! Mirrors every repository of a user or organization into a local directory
//! tree and prunes old releases by age or count.
//!
//! # Architecture
//!
//! - **pagination**: Generic page-by-page listing with limits
//! - **github**: REST client, transport retry and API types
//! - **git**: Local working copy operations (libgit2)
//! - **sync**: Clone-or-update engine with one fresh-clone retry
//! - **cleanup**: Release selection and release + tag deletion
//! - **orchestrator**: Backup and clean runs, progress reporting
//! - **config**: YAML configuration and validation
//! - **auth**: API token discovery

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod logging;
pub mod orchestrator;
pub mod pagination;
pub mod style;
pub mod sync;

// Re-exports
pub use error::{GithubbyError, Result};
