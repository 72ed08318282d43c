//! Backup and clean runs
//!
//! Both runs list everything first, then process items strictly one after
//! another. Listing errors abort the run; per-item failures are reported and
//! the loop moves on.

use super::report::{ItemEvent, ItemStatus, Reporter, RunSummary};
use crate::cleanup::{ReleaseCleaner, ReleaseFilter};
use crate::config::GithubbyConfig;
use crate::git::GitBackend;
use crate::github::{GitHubApi, ReleasePages, RepositoryPages};
use crate::pagination::{EmptyPolicy, PageAggregator, MAX_PAGE_SIZE};
use crate::sync::RepositorySyncEngine;
use crate::{GithubbyError, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Knobs shared by every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub page_size: usize,
    pub empty_policy: EmptyPolicy,
    /// Replace mutating calls with `dry_run_delay`
    pub dry_run: bool,
    pub dry_run_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            empty_policy: EmptyPolicy::Error,
            dry_run: false,
            dry_run_delay: Duration::from_millis(250),
        }
    }
}

impl RunSettings {
    pub fn from_config(config: &GithubbyConfig, dry_run: bool) -> Self {
        Self {
            page_size: config.page_size,
            empty_policy: config.empty_results,
            dry_run,
            dry_run_delay: config.dry_run_delay(),
        }
    }
}

/// Back up every repository of `owner` under `output_root`
#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub owner: String,
    pub output_root: PathBuf,
    /// Maximum repositories to process; `None` or `Some(0)` means all
    pub limit: Option<usize>,
}

/// Delete the releases of `owner/repo` selected by `filter`
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub owner: String,
    pub repo: String,
    pub filter: ReleaseFilter,
}

impl CleanRequest {
    /// Build a request from an `OWNER/REPO` slug
    pub fn from_slug(slug: &str, filter: ReleaseFilter) -> Result<Self> {
        match slug.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    filter,
                })
            }
            _ => Err(GithubbyError::Config(format!(
                "Repository must be given as OWNER/REPO (got '{}')",
                slug
            ))),
        }
    }
}

/// Drives backup and clean runs over a [`GitHubApi`]
///
/// Cleaning only needs the API. Backups also need a sync engine, attached
/// with [`Orchestrator::with_engine`].
pub struct Orchestrator<A, E = ()> {
    api: A,
    engine: E,
    settings: RunSettings,
}

impl<A: GitHubApi> Orchestrator<A> {
    pub fn new(api: A, settings: RunSettings) -> Self {
        Self {
            api,
            engine: (),
            settings,
        }
    }
}

impl<A: GitHubApi, E> Orchestrator<A, E> {
    pub fn with_engine<B: GitBackend>(
        self,
        engine: RepositorySyncEngine<B>,
    ) -> Orchestrator<A, RepositorySyncEngine<B>> {
        Orchestrator {
            api: self.api,
            engine,
            settings: self.settings,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    fn aggregator(&self, limit: Option<usize>) -> PageAggregator {
        PageAggregator::new()
            .with_limit(limit)
            .with_max_page_size(self.settings.page_size)
            .with_empty_policy(self.settings.empty_policy)
    }

    async fn simulate(&self) {
        tokio::time::sleep(self.settings.dry_run_delay).await;
    }
}

impl<A: GitHubApi, B: GitBackend> Orchestrator<A, RepositorySyncEngine<B>> {
    pub fn engine(&self) -> &RepositorySyncEngine<B> {
        &self.engine
    }

    /// Clone or update every repository of the requested owner
    pub async fn backup(
        &self,
        request: &BackupRequest,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary> {
        let repositories = self
            .aggregator(request.limit)
            .collect(&RepositoryPages::new(&self.api, &request.owner))
            .await?;

        let total = repositories.len();
        let dry_run = self.settings.dry_run;
        info!(owner = %request.owner, total, dry_run, "Starting backup");

        let mut summary = RunSummary::new(total, dry_run);
        reporter.started(total, dry_run);

        for (index, repository) in repositories.iter().enumerate() {
            let path = repository.backup_path(&request.output_root, self.engine.protocol());

            let status = if dry_run {
                debug!(
                    repository = %repository.full_name,
                    path = %path.display(),
                    "Dry run: skipping sync"
                );
                self.simulate().await;
                ItemStatus::Simulated
            } else {
                let outcome = self.engine.sync(repository, &path, true);
                if let Some(error) = outcome.clone().into_error(&repository.full_name) {
                    warn!(path = %path.display(), "{}", error);
                }
                ItemStatus::from(outcome)
            };

            let event = ItemEvent {
                index: index + 1,
                total,
                name: repository.full_name.clone(),
                status,
            };
            summary.record(&event);
            reporter.item(&event);
        }

        info!(
            owner = %request.owner,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            "Backup finished"
        );
        reporter.finished(&summary);
        Ok(summary)
    }
}

impl<A: GitHubApi, E> Orchestrator<A, E> {
    /// Delete selected releases (and their tags) of the requested repository
    pub async fn clean(
        &self,
        request: &CleanRequest,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary> {
        self.clean_at(request, Utc::now(), reporter).await
    }

    /// [`Orchestrator::clean`] with an explicit reference time for the age rule
    pub async fn clean_at(
        &self,
        request: &CleanRequest,
        now: DateTime<Utc>,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary> {
        let releases = self
            .aggregator(None)
            .collect(&ReleasePages::new(&self.api, &request.owner, &request.repo))
            .await?;

        let listed = releases.len();
        let selected = request.filter.select(releases, now);
        let total = selected.len();
        let dry_run = self.settings.dry_run;
        info!(
            owner = %request.owner,
            repo = %request.repo,
            listed,
            selected = total,
            dry_run,
            "Starting clean"
        );

        let cleaner = ReleaseCleaner::new(&self.api);
        let mut summary = RunSummary::new(total, dry_run);
        reporter.started(total, dry_run);

        for (index, release) in selected.iter().enumerate() {
            let status = if dry_run {
                debug!(tag = %release.tag_name, "Dry run: skipping release removal");
                self.simulate().await;
                ItemStatus::Simulated
            } else {
                match cleaner
                    .remove_release(&request.owner, &request.repo, release)
                    .await
                {
                    Ok(()) => ItemStatus::Removed,
                    Err(e) => {
                        warn!(tag = %release.tag_name, "{}", e);
                        ItemStatus::Failed(e.to_string())
                    }
                }
            };

            let event = ItemEvent {
                index: index + 1,
                total,
                name: release.tag_name.clone(),
                status,
            };
            summary.record(&event);
            reporter.item(&event);
        }

        info!(
            owner = %request.owner,
            repo = %request.repo,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            "Clean finished"
        );
        reporter.finished(&summary);
        Ok(summary)
    }
}
