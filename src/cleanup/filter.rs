//! Age and count based release selection

use crate::github::ReleaseDescriptor;
use crate::{GithubbyError, Result};
use chrono::{DateTime, Duration, Utc};

/// Which releases are eligible for deletion
///
/// A release is selected when any configured rule matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseFilter {
    max_age_days: Option<i64>,
    max_age: Option<Duration>,
    keep_count: Option<usize>,
}

impl ReleaseFilter {
    /// Build a filter from raw CLI values
    ///
    /// At least one rule must be given and neither may be negative.
    pub fn new(max_age_days: Option<i64>, keep_count: Option<i64>) -> Result<Self> {
        if max_age_days.is_none() && keep_count.is_none() {
            return Err(GithubbyError::Config(
                "At least one of --filter-days or --filter-count is required".to_string(),
            ));
        }

        let max_age = match max_age_days {
            Some(days) if days < 0 => {
                return Err(GithubbyError::Config(format!(
                    "--filter-days must not be negative (got {})",
                    days
                )));
            }
            Some(days) => Some(Duration::try_days(days).ok_or_else(|| {
                GithubbyError::Config(format!("--filter-days is too large (got {})", days))
            })?),
            None => None,
        };

        let keep_count = match keep_count {
            Some(count) => Some(usize::try_from(count).map_err(|_| {
                GithubbyError::Config(format!(
                    "--filter-count must not be negative (got {})",
                    count
                ))
            })?),
            None => None,
        };

        Ok(Self {
            max_age_days,
            max_age,
            keep_count,
        })
    }

    pub fn max_age_days(&self) -> Option<i64> {
        self.max_age_days
    }

    pub fn keep_count(&self) -> Option<usize> {
        self.keep_count
    }

    /// Releases to delete, newest first
    pub fn select(
        &self,
        releases: Vec<ReleaseDescriptor>,
        now: DateTime<Utc>,
    ) -> Vec<ReleaseDescriptor> {
        let mut releases = releases;
        releases.sort_by(|a, b| b.released_at().cmp(&a.released_at()));

        // A cutoff before the earliest representable time selects nothing by age
        let cutoff = self.max_age.and_then(|age| now.checked_sub_signed(age));

        releases
            .into_iter()
            .enumerate()
            .filter(|(index, release)| {
                let too_old = cutoff.is_some_and(|cutoff| release.released_at() < cutoff);
                let beyond_keep = self.keep_count.is_some_and(|keep| *index >= keep);
                too_old || beyond_keep
            })
            .map(|(_, release)| release)
            .collect()
    }
}
