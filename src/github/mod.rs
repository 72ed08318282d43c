//! GitHub REST integration
//!
//! Repository and release listings, release and tag deletion, and the
//! transport retry policy that keeps rate-limited calls alive.

mod api;
mod client;
pub mod retry;
mod types;

pub use api::{GitHubApi, ReleasePages, RepositoryPages};
pub use client::{parse_next_page, rate_limit_wait, GitHubClient, DEFAULT_API_URL};
pub use retry::{with_retry, RetryConfig, RetryDecision, RetryableError};
pub use types::{
    url_host, CloneProtocol, ReleaseDescriptor, RepositoryDescriptor, RepositoryOwner,
    DEFAULT_HOST,
};
