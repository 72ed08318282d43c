//! Remote capabilities consumed by the core, and their page-source adapters

use super::types::{ReleaseDescriptor, RepositoryDescriptor};
use crate::pagination::{Page, PageSource};
use crate::Result;
use async_trait::async_trait;

/// What the backup and clean paths need from the hosting API
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_repositories(
        &self,
        owner: &str,
        page: u32,
        per_page: usize,
    ) -> Result<Page<RepositoryDescriptor>>;

    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: usize,
    ) -> Result<Page<ReleaseDescriptor>>;

    /// Delete the release object at `release.url`
    async fn delete_release(&self, release: &ReleaseDescriptor) -> Result<()>;

    /// Delete `refs/tags/<tag>`
    async fn delete_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<()>;
}

/// Repositories of one user or organization
pub struct RepositoryPages<'a, A: ?Sized> {
    api: &'a A,
    owner: &'a str,
}

impl<'a, A: GitHubApi + ?Sized> RepositoryPages<'a, A> {
    pub fn new(api: &'a A, owner: &'a str) -> Self {
        Self { api, owner }
    }
}

#[async_trait]
impl<A: GitHubApi + ?Sized> PageSource for RepositoryPages<'_, A> {
    type Item = RepositoryDescriptor;

    fn resource(&self) -> String {
        format!("repositories for {}", self.owner)
    }

    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page<RepositoryDescriptor>> {
        self.api
            .list_repositories(self.owner, cursor, per_page)
            .await
    }
}

/// Releases of one repository
pub struct ReleasePages<'a, A: ?Sized> {
    api: &'a A,
    owner: &'a str,
    repo: &'a str,
}

impl<'a, A: GitHubApi + ?Sized> ReleasePages<'a, A> {
    pub fn new(api: &'a A, owner: &'a str, repo: &'a str) -> Self {
        Self { api, owner, repo }
    }
}

#[async_trait]
impl<A: GitHubApi + ?Sized> PageSource for ReleasePages<'_, A> {
    type Item = ReleaseDescriptor;

    fn resource(&self) -> String {
        format!("releases for {}/{}", self.owner, self.repo)
    }

    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page<ReleaseDescriptor>> {
        self.api
            .list_releases(self.owner, self.repo, cursor, per_page)
            .await
    }
}
