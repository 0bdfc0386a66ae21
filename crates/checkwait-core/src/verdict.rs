//! Verdict evaluation: the empty-snapshot decision and the conclusion policy.

use crate::check::{CheckRun, Conclusion};
use crate::error::{Result, WaitError};
use serde::{Deserialize, Serialize};

/// Why the first filtered snapshot was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The provider reported no checks at all for the ref.
    NoChecks,
    /// Checks exist, but none survived the filters.
    FilteredOut,
}

/// Outcome of the empty-snapshot decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPresence {
    /// There is something to wait for.
    Present,
    /// Nothing to wait for and the caller treats that as a failure.
    NoneMatchedFail(EmptyReason),
    /// Nothing to wait for and the caller accepts it.
    NoneMatchedOk(EmptyReason),
}

/// Decide what an initial snapshot means before any polling happens.
///
/// `raw_count` is the size of the unfiltered fetch and distinguishes a ref
/// with no checks at all from one whose checks were all filtered away.
pub fn classify_presence(
    raw_count: usize,
    filtered: &[CheckRun],
    fail_on_no_checks: bool,
) -> CheckPresence {
    if !filtered.is_empty() {
        return CheckPresence::Present;
    }

    let reason = if raw_count == 0 {
        EmptyReason::NoChecks
    } else {
        EmptyReason::FilteredOut
    };

    if fail_on_no_checks {
        CheckPresence::NoneMatchedFail(reason)
    } else {
        CheckPresence::NoneMatchedOk(reason)
    }
}

/// Final verdict of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Every relevant check completed with an allowed conclusion.
    AllPassed { checks: Vec<CheckRun> },
    /// Nothing matched and the caller opted into succeeding anyway.
    NoneMatched { reason: EmptyReason },
}

impl Verdict {
    /// Operator-facing summary line.
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::AllPassed { .. } => "All checks completed with an allowed conclusion.",
            Verdict::NoneMatched {
                reason: EmptyReason::FilteredOut,
            } => "No checks found matching the filter, but fail-on-no-checks is false. Succeeding...",
            Verdict::NoneMatched {
                reason: EmptyReason::NoChecks,
            } => "No checks were run against this ref, but fail-on-no-checks is false. Succeeding...",
        }
    }
}

/// Check every terminal conclusion against the allow-list.
///
/// A completed check without a conclusion is never allowed.
pub fn evaluate_conclusions(checks: &[CheckRun], allowed: &[Conclusion]) -> Result<()> {
    let rejected: Vec<String> = checks
        .iter()
        .filter(|check| {
            check
                .conclusion
                .as_ref()
                .map_or(true, |conclusion| !allowed.contains(conclusion))
        })
        .map(|check| check.name.clone())
        .collect();

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(WaitError::ConclusionNotAllowed {
            allowed: allowed.to_vec(),
            rejected,
        })
    }
}
