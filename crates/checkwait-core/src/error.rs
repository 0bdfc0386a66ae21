//! Error taxonomy for the reconciliation engine.

use crate::check::Conclusion;
use crate::verdict::EmptyReason;

/// Errors that end a wait.
///
/// Every variant is fatal: the loop never retries or swallows an error, the
/// only repetition it performs is polling check *status*.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// The targeted checks were not found on the first snapshot.
    #[error("{}", never_run_message(.reason))]
    NeverRun { reason: EmptyReason },

    /// At least one terminal check has a conclusion outside the allow-list.
    #[error(
        "The conclusion of one or more checks were not allowed. Allowed conclusions are: {}. \
         This can be configured with the 'allowed-conclusions' param.",
        join_conclusions(.allowed)
    )]
    ConclusionNotAllowed {
        allowed: Vec<Conclusion>,
        /// Names of the offending checks.
        rejected: Vec<String>,
    },

    /// The fetcher could not reach or decode the provider API.
    #[error("failed to fetch check runs: {0}")]
    Transport(String),

    /// Invalid inputs, detected before the first fetch.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type for wait operations.
pub type Result<T> = std::result::Result<T, WaitError>;

fn never_run_message(reason: &EmptyReason) -> &'static str {
    match reason {
        EmptyReason::FilteredOut => "The requested check was never run against this ref, exiting...",
        EmptyReason::NoChecks => "No checks were run against this ref, exiting...",
    }
}

pub(crate) fn join_conclusions(conclusions: &[Conclusion]) -> String {
    conclusions
        .iter()
        .map(Conclusion::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<regex::Error> for WaitError {
    fn from(err: regex::Error) -> Self {
        WaitError::Configuration(format!("invalid check regexp: {err}"))
    }
}
