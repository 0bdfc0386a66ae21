//! Error types for the GitHub fetcher

use checkwait_core::WaitError;
use thiserror::Error;

/// Errors that can occur while talking to the GitHub API
#[derive(Error, Debug)]
pub enum GithubError {
    /// Repository slug is not `owner/name`
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    /// Endpoint override is not a usable URL
    #[error("invalid API endpoint: {0}")]
    InvalidEndpoint(String),

    /// Non-success response from the API
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network or TLS failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not match the check-runs schema
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}

impl From<GithubError> for WaitError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::InvalidRepository(_) | GithubError::InvalidEndpoint(_) => {
                WaitError::Configuration(err.to_string())
            }
            other => WaitError::Transport(other.to_string()),
        }
    }
}
