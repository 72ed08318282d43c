//! GitHub REST client
//!
//! Implements [`GitHubApi`] over reqwest. Page cursors come from the `Link`
//! response header; rate-limit responses are turned into
//! [`GithubbyError::RateLimited`] so the retry policy can wait them out.

use super::api::GitHubApi;
use super::retry::{with_retry, RetryConfig};
use super::types::{ReleaseDescriptor, RepositoryDescriptor};
use crate::pagination::Page;
use crate::{GithubbyError, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("githubby/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Authenticated GitHub REST client
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a client for `base_url` (public GitHub or an Enterprise `/api/v3` root)
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn repositories_url(&self, owner: &str, page: u32, per_page: usize) -> String {
        format!(
            "{}/users/{}/repos?per_page={}&page={}",
            self.base_url,
            urlencoding::encode(owner),
            per_page,
            page
        )
    }

    fn releases_url(&self, owner: &str, repo: &str, page: u32, per_page: usize) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}&page={}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            per_page,
            page
        )
    }

    /// Tag names may contain `/`, so each segment is encoded separately
    fn tag_ref_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        let encoded_tag = tag
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/git/refs/tags/{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            encoded_tag
        )
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str, page: u32) -> Result<Page<T>> {
        with_retry(&self.retry, url, move || self.get_page_once(url, page)).await
    }

    async fn get_page_once<T: DeserializeOwned>(&self, url: &str, page: u32) -> Result<Page<T>> {
        debug!(url = %url, "GET");
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = check_response(response).await?;

        let next_page = response
            .headers()
            .get(header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_page);

        let items: Vec<T> = response.json().await?;
        Ok(Page::new(items, page, next_page))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        with_retry(&self.retry, url, move || self.delete_once(url)).await
    }

    async fn delete_once(&self, url: &str) -> Result<()> {
        debug!(url = %url, "DELETE");
        let response = self.authorized(self.client.delete(url)).send().await?;
        check_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_repositories(
        &self,
        owner: &str,
        page: u32,
        per_page: usize,
    ) -> Result<Page<RepositoryDescriptor>> {
        let url = self.repositories_url(owner, page, per_page);
        self.get_page(&url, page).await
    }

    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: usize,
    ) -> Result<Page<ReleaseDescriptor>> {
        let url = self.releases_url(owner, repo, page, per_page);
        self.get_page(&url, page).await
    }

    async fn delete_release(&self, release: &ReleaseDescriptor) -> Result<()> {
        info!(tag = %release.tag_name, id = release.id, "Deleting release");
        self.delete(&release.url).await
    }

    async fn delete_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<()> {
        info!(owner = %owner, repo = %repo, tag = %tag, "Deleting tag");
        let url = self.tag_ref_url(owner, repo, tag);
        self.delete(&url).await
    }
}

/// Map a non-success response to an error
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let now = chrono::Utc::now().timestamp();
    if let Some(wait) = rate_limit_wait(status, response.headers(), now) {
        return Err(GithubbyError::RateLimited(wait));
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(GithubbyError::Auth(
            "GitHub rejected the token (HTTP 401)".to_string(),
        ));
    }

    let body = response.text().await.unwrap_or_default();
    Err(GithubbyError::Api {
        status: status.as_u16(),
        message: api_message(&body),
    })
}

/// Seconds to wait when a response signals rate limiting, `None` otherwise
///
/// GitHub signals primary limits with 403/429 and `x-ratelimit-remaining: 0`
/// (reset time in `x-ratelimit-reset`), and secondary limits with `retry-after`.
pub fn rate_limit_wait(status: StatusCode, headers: &HeaderMap, now: i64) -> Option<u64> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    if let Some(secs) =
        header_str(headers, "retry-after").and_then(|v| v.trim().parse::<u64>().ok())
    {
        return Some(secs);
    }

    if header_str(headers, "x-ratelimit-remaining") == Some("0") {
        let reset = header_str(headers, "x-ratelimit-reset")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(now + 60);
        return Some((reset - now).max(1) as u64);
    }

    (status == StatusCode::TOO_MANY_REQUESTS).then_some(60)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract the `page` query parameter of the `rel="next"` entry of a `Link` header
pub fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|p| p.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }

        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(url).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client() -> GitHubClient {
        GitHubClient::new("https://api.github.com/", None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_next_page() {
        let link = r#"<https://api.github.com/user/1/repos?per_page=100&page=2>; rel="next", <https://api.github.com/user/1/repos?per_page=100&page=7>; rel="last""#;
        assert_eq!(parse_next_page(link), Some(2));
    }

    #[test]
    fn test_parse_next_page_absent_on_last_page() {
        let link = r#"<https://api.github.com/user/1/repos?page=1>; rel="first", <https://api.github.com/user/1/repos?page=6>; rel="prev""#;
        assert_eq!(parse_next_page(link), None);
        assert_eq!(parse_next_page(""), None);
    }

    #[test]
    fn test_rate_limit_from_reset_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1000"));

        assert_eq!(
            rate_limit_wait(StatusCode::FORBIDDEN, &headers, 970),
            Some(30)
        );
        assert_eq!(
            rate_limit_wait(StatusCode::FORBIDDEN, &headers, 2000),
            Some(1)
        );
    }

    #[test]
    fn test_rate_limit_from_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("12"));
        assert_eq!(
            rate_limit_wait(StatusCode::TOO_MANY_REQUESTS, &headers, 0),
            Some(12)
        );
    }

    #[test]
    fn test_plain_forbidden_is_not_rate_limited() {
        let headers = HeaderMap::new();
        assert_eq!(rate_limit_wait(StatusCode::FORBIDDEN, &headers, 0), None);
        assert_eq!(rate_limit_wait(StatusCode::NOT_FOUND, &headers, 0), None);
        assert_eq!(
            rate_limit_wait(StatusCode::TOO_MANY_REQUESTS, &headers, 0),
            Some(60)
        );
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.base_url(), "https://api.github.com");
        assert_eq!(
            client.repositories_url("octocat", 2, 50),
            "https://api.github.com/users/octocat/repos?per_page=50&page=2"
        );
        assert_eq!(
            client.releases_url("octocat", "Hello-World", 1, 100),
            "https://api.github.com/repos/octocat/Hello-World/releases?per_page=100&page=1"
        );
        assert_eq!(
            client.tag_ref_url("octocat", "Hello-World", "release/v1.0+build"),
            "https://api.github.com/repos/octocat/Hello-World/git/refs/tags/release/v1.0%2Bbuild"
        );
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let client =
            GitHubClient::new(DEFAULT_API_URL, Some(String::new()), Duration::from_secs(5))
                .unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_api_message_extraction() {
        assert_eq!(api_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(api_message("  plain text "), "plain text");
    }
}
