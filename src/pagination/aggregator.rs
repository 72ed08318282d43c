//! Cursor-driven page aggregator

use crate::{GithubbyError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest page the GitHub REST API will serve
pub const MAX_PAGE_SIZE: usize = 100;

/// One fetched page of a remote listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in remote order
    pub items: Vec<T>,

    /// Cursor that was requested
    pub page: u32,

    /// Next cursor reported by the remote, `None` on the last page
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, next_page: Option<u32>) -> Self {
        Self {
            items,
            page,
            next_page,
        }
    }

    /// A page with no successor
    pub fn last(items: Vec<T>, page: u32) -> Self {
        Self::new(items, page, None)
    }
}

/// Capability to fetch a single page of a listing
#[async_trait]
pub trait PageSource {
    type Item: Send;

    /// Label used in errors and logs, e.g. "repositories of octocat"
    fn resource(&self) -> String;

    async fn fetch_page(&self, cursor: u32, per_page: usize) -> Result<Page<Self::Item>>;
}

/// Whether a listing that yields nothing is a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Zero items fails with `EmptyResult`
    #[default]
    Error,
    /// Zero items is a valid, empty collection
    Allow,
}

/// Collects every page of a listing, honoring an optional total limit
#[derive(Debug, Clone)]
pub struct PageAggregator {
    limit: Option<usize>,
    max_page_size: usize,
    empty_policy: EmptyPolicy,
}

impl Default for PageAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAggregator {
    pub fn new() -> Self {
        Self {
            limit: None,
            max_page_size: MAX_PAGE_SIZE,
            empty_policy: EmptyPolicy::Error,
        }
    }

    /// Cap the total number of collected items. `0` means no limit.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|l| *l > 0);
        self
    }

    /// Override the platform page size (clamped to 1..=MAX_PAGE_SIZE)
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Page size to request: the limit when it fits in one page, otherwise the maximum
    pub fn per_page(&self) -> usize {
        match self.limit {
            Some(limit) if limit < self.max_page_size => limit,
            _ => self.max_page_size,
        }
    }

    /// Fetch pages until the remote runs out or the limit is satisfied
    pub async fn collect<S>(&self, source: &S) -> Result<Vec<S::Item>>
    where
        S: PageSource + Sync,
    {
        let resource = source.resource();
        let per_page = self.per_page();
        let mut items = Vec::new();
        let mut cursor = 1u32;

        loop {
            let page = source
                .fetch_page(cursor, per_page)
                .await
                .map_err(|e| GithubbyError::Fetch {
                    resource: resource.clone(),
                    page: cursor,
                    source: Box::new(e),
                })?;

            debug!(
                resource = %resource,
                page = cursor,
                count = page.items.len(),
                next = ?page.next_page,
                "Fetched page"
            );

            items.extend(page.items);

            let remaining = self.limit.map(|limit| limit.saturating_sub(items.len()));

            match page.next_page {
                Some(next) if next > cursor && remaining != Some(0) => {
                    debug!(resource = %resource, from = cursor, to = next, "Moving to next page");
                    cursor = next;
                }
                _ => break,
            }
        }

        if let Some(limit) = self.limit {
            items.truncate(limit);
        }

        if items.is_empty() && self.empty_policy == EmptyPolicy::Error {
            return Err(GithubbyError::EmptyResult(resource));
        }

        Ok(items)
    }
}
