//! GitHub check-runs client
//!
//! Lists every check run for a ref via the REST API, following pagination
//! links until the full snapshot has been read.

use crate::error::GithubError;
use crate::Result;
use async_trait::async_trait;
use checkwait_core::{CheckFetcher, CheckRun};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Public GitHub API endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const API_TIMEOUT_SECS: u64 = 60;
const PAGE_SIZE: u32 = 100;

/// Maximum length for error body content in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

/// GitHub connection settings
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base URL (GitHub Enterprise installs use their own)
    pub api_endpoint: String,
    /// `owner/name`
    pub repository: String,
    /// Access token (optional for public repositories)
    pub token: Option<String>,
}

impl GithubConfig {
    /// Config for a repository on the public API
    pub fn new(repository: &str) -> Self {
        GithubConfig {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            repository: repository.to_string(),
            token: None,
        }
    }

    /// Override the API endpoint. Blank values keep the default.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        if !endpoint.trim().is_empty() {
            self.api_endpoint = endpoint.trim().to_string();
        }
        self
    }

    /// Set authentication token. Blank values are ignored.
    pub fn with_token(mut self, token: &str) -> Self {
        if !token.trim().is_empty() {
            self.token = Some(token.trim().to_string());
        }
        self
    }

    /// Split `owner/name` into its parts.
    pub fn owner_and_name(&self) -> Result<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok((owner, name))
            }
            _ => Err(GithubError::InvalidRepository(self.repository.clone())),
        }
    }

    /// URL of the first check-runs page for `reference`.
    pub fn check_runs_url(&self, reference: &str) -> Result<Url> {
        let (owner, name) = self.owner_and_name()?;
        let mut url = Url::parse(&self.api_endpoint)
            .map_err(|e| GithubError::InvalidEndpoint(format!("{}: {e}", self.api_endpoint)))?;

        url.path_segments_mut()
            .map_err(|_| GithubError::InvalidEndpoint(self.api_endpoint.clone()))?
            .pop_if_empty()
            .extend(["repos", owner, name, "commits", reference, "check-runs"]);
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string());

        Ok(url)
    }
}

/// One page of `GET /repos/{owner}/{repo}/commits/{ref}/check-runs`
#[derive(Debug, Deserialize)]
pub struct CheckRunsPage {
    pub total_count: u64,
    pub check_runs: Vec<CheckRun>,
}

/// Decode a check-runs page. Unknown fields are ignored.
pub fn parse_check_runs_page(body: &str) -> Result<CheckRunsPage> {
    Ok(serde_json::from_str(body)?)
}

/// Extract the `rel="next"` target from a `Link` header.
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == "rel=\"next\"");
        if is_next {
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string)
        } else {
            None
        }
    })
}

/// Turn a failed response body into a short, safe message.
///
/// Prefers the API's JSON `message`; raw bodies are truncated.
pub fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiErrorResponse {
        message: String,
    }

    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        return api_error.message;
    }

    let body = body.trim();
    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{truncated}... (truncated)")
    } else {
        body.to_string()
    }
}

/// GitHub client implementing [`CheckFetcher`]
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a new client. Fails on an invalid repository or token.
    pub fn new(config: GithubConfig) -> Result<Self> {
        config.owner_and_name()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GithubError::Http("access token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("checkwait/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;

        Ok(GithubClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// List every check run for `reference`, across all pages.
    pub async fn list_check_runs(&self, reference: &str) -> Result<Vec<CheckRun>> {
        let mut next = Some(self.config.check_runs_url(reference)?.to_string());
        let mut checks = Vec::new();
        let mut pages = 0u32;

        while let Some(url) = next {
            let resp = self.http_client.get(&url).send().await?;
            let status = resp.status();

            next = resp
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let body = resp.text().await?;
            if !status.is_success() {
                return Err(GithubError::Api {
                    status: status.as_u16(),
                    message: api_error_message(&body),
                });
            }

            let page = parse_check_runs_page(&body)?;
            pages += 1;
            debug!(
                page = pages,
                received = page.check_runs.len(),
                total = page.total_count,
                "fetched check-runs page"
            );
            checks.extend(page.check_runs);
        }

        Ok(checks)
    }
}

#[async_trait]
impl CheckFetcher for GithubClient {
    async fn fetch(&self, reference: &str) -> checkwait_core::Result<Vec<CheckRun>> {
        Ok(self.list_check_runs(reference).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_runs_url_default_endpoint() {
        let config = GithubConfig::new("octo/widgets");
        let url = config.check_runs_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/widgets/commits/abc123/check-runs?per_page=100"
        );
    }

    #[test]
    fn test_check_runs_url_enterprise_endpoint() {
        let config = GithubConfig::new("octo/widgets").with_endpoint("https://ghe.example.com/api/v3/");
        let url = config.check_runs_url("main").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/widgets/commits/main/check-runs?per_page=100"
        );
    }

    #[test]
    fn test_branch_ref_with_slash_is_encoded() {
        let config = GithubConfig::new("octo/widgets");
        let url = config.check_runs_url("feature/login").unwrap();
        assert!(url.as_str().contains("/commits/feature%2Flogin/check-runs"));
    }

    #[test]
    fn test_blank_endpoint_keeps_default() {
        let config = GithubConfig::new("octo/widgets").with_endpoint("   ");
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
    }

    #[test]
    fn test_invalid_repository() {
        for repo in ["widgets", "/widgets", "octo/", "a/b/c"] {
            let err = GithubConfig::new(repo).owner_and_name().unwrap_err();
            assert!(matches!(err, GithubError::InvalidRepository(_)), "{repo}");
        }
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = GithubConfig::new("octo/widgets")
            .with_endpoint("not a url")
            .check_runs_url("main")
            .unwrap_err();
        assert!(matches!(err, GithubError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_next_page_url() {
        let header = "<https://api.github.com/repositories/1/commits/abc/check-runs?per_page=100&page=2>; rel=\"next\", \
                      <https://api.github.com/repositories/1/commits/abc/check-runs?per_page=100&page=3>; rel=\"last\"";
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/repositories/1/commits/abc/check-runs?per_page=100&page=2")
        );
    }

    #[test]
    fn test_next_page_url_absent_on_last_page() {
        let header = "<https://api.github.com/x?page=1>; rel=\"prev\", <https://api.github.com/x?page=1>; rel=\"first\"";
        assert!(next_page_url(header).is_none());
    }

    #[test]
    fn test_api_error_message_prefers_json_message() {
        let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#;
        assert_eq!(api_error_message(body), "Bad credentials");
    }

    #[test]
    fn test_api_error_message_truncates_raw_body() {
        let body = "x".repeat(500);
        let message = api_error_message(&body);
        assert!(message.ends_with("... (truncated)"));
        assert!(message.len() < 250);
    }

    #[test]
    fn test_client_rejects_bad_repository() {
        assert!(GithubClient::new(GithubConfig::new("nope")).is_err());
    }

    #[test]
    fn test_client_builds_with_token() {
        let client = GithubClient::new(GithubConfig::new("octo/widgets").with_token("ghp_example"))
            .expect("client");
        assert_eq!(client.config().token.as_deref(), Some("ghp_example"));
    }
}
