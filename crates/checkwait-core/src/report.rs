//! Operator-facing progress output.
//!
//! This is the tool's user interface: a few plain lines on stdout. Diagnostic
//! logging goes through `tracing` instead and never mixes with it.

use crate::check::CheckRun;
use crate::verdict::Verdict;
use std::io::Write;
use std::time::Duration;

/// Receives progress lines from the reconciliation loop.
pub trait Reporter: Send + Sync {
    /// The current snapshot of `total` checks is not complete yet.
    fn waiting(&self, total: usize, interval: Duration);

    /// Every relevant check reached a terminal state.
    fn completed(&self, checks: &[CheckRun]);

    /// The wait ended successfully without checks to evaluate.
    fn none_matched(&self, verdict: &Verdict);
}

/// "The requested check isn't complete yet, ..." line.
pub fn waiting_line(total: usize, interval: Duration) -> String {
    let plural_part = if total > 1 {
        "checks aren't"
    } else {
        "check isn't"
    };
    format!(
        "The requested {} complete yet, will check back in {} seconds...",
        plural_part,
        interval.as_secs()
    )
}

/// "Checks completed:" header followed by one line per check.
pub fn completed_lines(checks: &[CheckRun]) -> Vec<String> {
    std::iter::once("Checks completed:".to_string())
        .chain(checks.iter().map(ToString::to_string))
        .collect()
}

/// Writes progress lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl StdoutReporter {
    fn emit(lines: &[String]) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for line in lines {
            // stdout closed by the caller: nothing useful left to do with the line
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}

impl Reporter for StdoutReporter {
    fn waiting(&self, total: usize, interval: Duration) {
        Self::emit(&[waiting_line(total, interval)]);
    }

    fn completed(&self, checks: &[CheckRun]) {
        Self::emit(&completed_lines(checks));
    }

    fn none_matched(&self, verdict: &Verdict) {
        Self::emit(&[verdict.message().to_string()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_line_singular() {
        assert_eq!(
            waiting_line(1, Duration::from_secs(0)),
            "The requested check isn't complete yet, will check back in 0 seconds..."
        );
    }

    #[test]
    fn test_waiting_line_plural() {
        assert_eq!(
            waiting_line(3, Duration::from_secs(30)),
            "The requested checks aren't complete yet, will check back in 30 seconds..."
        );
    }

    #[test]
    fn test_completed_lines() {
        let checks = vec![
            CheckRun::completed("check_completed", "success"),
            CheckRun::completed("docs", "skipped"),
        ];
        assert_eq!(
            completed_lines(&checks),
            vec![
                "Checks completed:",
                "check_completed: completed (success)",
                "docs: completed (skipped)",
            ]
        );
    }
}
