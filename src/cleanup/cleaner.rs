//! Release + tag deletion as one logical unit

use crate::error::CleanupStage;
use crate::github::{GitHubApi, ReleaseDescriptor};
use crate::{GithubbyError, Result};
use tracing::{debug, warn};

/// Deletes releases and their tags through a [`GitHubApi`]
pub struct ReleaseCleaner<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: GitHubApi + ?Sized> ReleaseCleaner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Delete `release`, then its tag
    ///
    /// The tag is only touched once the release is gone. A tag failure after
    /// a successful release deletion leaves the tag behind and is reported as
    /// a [`CleanupStage::Tag`] failure.
    pub async fn remove_release(
        &self,
        owner: &str,
        repo: &str,
        release: &ReleaseDescriptor,
    ) -> Result<()> {
        debug!(
            owner = %owner,
            repo = %repo,
            tag = %release.tag_name,
            name = %release.display_name(),
            "Removing release"
        );

        self.api
            .delete_release(release)
            .await
            .map_err(|e| GithubbyError::CleanupFailure {
                tag: release.tag_name.clone(),
                stage: CleanupStage::Release,
                reason: e.to_string(),
            })?;

        self.api
            .delete_tag(owner, repo, &release.tag_name)
            .await
            .map_err(|e| {
                warn!(
                    owner = %owner,
                    repo = %repo,
                    tag = %release.tag_name,
                    "Release deleted but tag deletion failed: {}",
                    e
                );
                GithubbyError::CleanupFailure {
                    tag: release.tag_name.clone(),
                    stage: CleanupStage::Tag,
                    reason: e.to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepositoryDescriptor;
    use crate::pagination::Page;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        fail_release: bool,
        fail_tag: bool,
    }

    #[async_trait]
    impl GitHubApi for RecordingApi {
        async fn list_repositories(
            &self,
            _owner: &str,
            page: u32,
            _per_page: usize,
        ) -> Result<Page<RepositoryDescriptor>> {
            Ok(Page::last(Vec::new(), page))
        }

        async fn list_releases(
            &self,
            _owner: &str,
            _repo: &str,
            page: u32,
            _per_page: usize,
        ) -> Result<Page<ReleaseDescriptor>> {
            Ok(Page::last(Vec::new(), page))
        }

        async fn delete_release(&self, release: &ReleaseDescriptor) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("release:{}", release.id));
            if self.fail_release {
                Err(GithubbyError::Api {
                    status: 404,
                    message: "Not Found".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn delete_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("tag:{}/{}/{}", owner, repo, tag));
            if self.fail_tag {
                Err(GithubbyError::Api {
                    status: 422,
                    message: "Reference does not exist".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn release() -> ReleaseDescriptor {
        ReleaseDescriptor {
            id: 42,
            url: "https://api.github.com/repos/acme/widget/releases/42".to_string(),
            tag_name: "v1.2.3".to_string(),
            name: None,
            draft: false,
            prerelease: false,
            created_at: Utc::now(),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_release_then_tag() {
        let api = RecordingApi::default();
        ReleaseCleaner::new(&api)
            .remove_release("acme", "widget", &release())
            .await
            .unwrap();

        assert_eq!(
            *api.calls.lock().unwrap(),
            vec!["release:42", "tag:acme/widget/v1.2.3"]
        );
    }

    #[tokio::test]
    async fn test_release_failure_leaves_tag_untouched() {
        let api = RecordingApi {
            fail_release: true,
            ..Default::default()
        };
        let err = ReleaseCleaner::new(&api)
            .remove_release("acme", "widget", &release())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GithubbyError::CleanupFailure {
                stage: CleanupStage::Release,
                ..
            }
        ));
        assert_eq!(*api.calls.lock().unwrap(), vec!["release:42"]);
    }

    #[tokio::test]
    async fn test_tag_failure_is_reported() {
        let api = RecordingApi {
            fail_tag: true,
            ..Default::default()
        };
        let err = ReleaseCleaner::new(&api)
            .remove_release("acme", "widget", &release())
            .await
            .unwrap_err();

        match err {
            GithubbyError::CleanupFailure { tag, stage, reason } => {
                assert_eq!(tag, "v1.2.3");
                assert_eq!(stage, CleanupStage::Tag);
                assert!(reason.contains("Reference does not exist"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }
}
