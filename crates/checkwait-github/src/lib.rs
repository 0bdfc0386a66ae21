//! checkwait-github: GitHub check-runs fetcher
//!
//! Implements [`checkwait_core::CheckFetcher`] on top of the GitHub REST
//! API (`GET /repos/{owner}/{repo}/commits/{ref}/check-runs`), including
//! GitHub Enterprise endpoints and `Link` header pagination.

pub mod client;
pub mod error;

pub use client::{
    api_error_message, next_page_url, parse_check_runs_page, CheckRunsPage, GithubClient,
    GithubConfig, DEFAULT_API_ENDPOINT,
};
pub use error::GithubError;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;
