//! Check-run snapshot types.
//!
//! Status and conclusion values are provider-defined strings that may grow
//! over time, so both are modelled as open enumerations: known values get a
//! variant, anything else is kept verbatim in `Other`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a check run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckStatus {
    Queued,
    InProgress,
    Completed,
    /// Any value the provider reports that we do not know about.
    /// Never treated as terminal.
    Other(String),
}

impl CheckStatus {
    /// Canonical provider string.
    pub fn as_str(&self) -> &str {
        match self {
            CheckStatus::Queued => "queued",
            CheckStatus::InProgress => "in_progress",
            CheckStatus::Completed => "completed",
            CheckStatus::Other(s) => s,
        }
    }

    /// Whether the check has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckStatus::Completed)
    }
}

impl From<&str> for CheckStatus {
    fn from(s: &str) -> Self {
        match s {
            "queued" => CheckStatus::Queued,
            "in_progress" => CheckStatus::InProgress,
            "completed" => CheckStatus::Completed,
            other => CheckStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for CheckStatus {
    fn from(s: String) -> Self {
        CheckStatus::from(s.as_str())
    }
}

impl From<CheckStatus> for String {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a completed check run.
///
/// Comparison is exact and case-sensitive: `"Success"` parses to
/// `Other("Success")`, which is not equal to [`Conclusion::Success`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conclusion {
    Success,
    Failure,
    Skipped,
    Neutral,
    Cancelled,
    TimedOut,
    ActionRequired,
    Stale,
    Other(String),
}

impl Conclusion {
    /// Canonical provider string.
    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Skipped => "skipped",
            Conclusion::Neutral => "neutral",
            Conclusion::Cancelled => "cancelled",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Stale => "stale",
            Conclusion::Other(s) => s,
        }
    }

    /// The default allow-list: `success, skipped`.
    pub fn default_allowed() -> Vec<Conclusion> {
        vec![Conclusion::Success, Conclusion::Skipped]
    }
}

impl From<&str> for Conclusion {
    fn from(s: &str) -> Self {
        match s {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "skipped" => Conclusion::Skipped,
            "neutral" => Conclusion::Neutral,
            "cancelled" => Conclusion::Cancelled,
            "timed_out" => Conclusion::TimedOut,
            "action_required" => Conclusion::ActionRequired,
            "stale" => Conclusion::Stale,
            other => Conclusion::Other(other.to_string()),
        }
    }
}

impl From<String> for Conclusion {
    fn from(s: String) -> Self {
        Conclusion::from(s.as_str())
    }
}

impl From<Conclusion> for String {
    fn from(conclusion: Conclusion) -> Self {
        match conclusion {
            Conclusion::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed unit of CI work, as reported by the provider.
///
/// Snapshots are rebuilt from scratch on every poll and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name. Not guaranteed unique within a snapshot.
    pub name: String,

    /// Lifecycle state.
    pub status: CheckStatus,

    /// Outcome, present once `status` is completed.
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
}

impl CheckRun {
    pub fn new(name: impl Into<String>, status: impl Into<CheckStatus>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            conclusion: None,
        }
    }

    /// Shorthand for a completed check with the given conclusion.
    pub fn completed(name: impl Into<String>, conclusion: impl Into<Conclusion>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Completed,
            conclusion: Some(conclusion.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

impl fmt::Display for CheckRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conclusion = self.conclusion.as_ref().map(Conclusion::as_str).unwrap_or("");
        write!(f, "{}: {} ({})", self.name, self.status, conclusion)
    }
}

/// Completion predicate: every check is completed.
///
/// Trivially true for an empty slice; callers that must not treat "nothing
/// to wait for" as success decide that case before polling.
pub fn all_completed(checks: &[CheckRun]) -> bool {
    checks.iter().all(CheckRun::is_completed)
}
