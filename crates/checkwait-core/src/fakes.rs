//! In-memory fakes for the fetcher and reporter seams (testing only).
//!
//! `ScriptedFetcher` replays a fixed sequence of snapshots and
//! `RecordingReporter` captures progress lines instead of printing them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::check::CheckRun;
use crate::error::{Result, WaitError};
use crate::reconcile::CheckFetcher;
use crate::report::{completed_lines, waiting_line, Reporter};
use crate::verdict::Verdict;

// ---------------------------------------------------------------------------
// ScriptedFetcher
// ---------------------------------------------------------------------------

/// One scripted response.
#[derive(Debug, Clone)]
pub enum FetchStep {
    Snapshot(Vec<CheckRun>),
    Fail(String),
}

/// Fetcher that returns scripted responses in order.
///
/// Once the script is exhausted the last step is repeated, so a script that
/// ends with a terminal snapshot behaves like a provider that has settled.
#[derive(Debug)]
pub struct ScriptedFetcher {
    steps: Vec<FetchStep>,
    calls: AtomicUsize,
    references: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new(snapshots: Vec<Vec<CheckRun>>) -> Self {
        Self::from_steps(snapshots.into_iter().map(FetchStep::Snapshot).collect())
    }

    pub fn from_steps(steps: Vec<FetchStep>) -> Self {
        Self {
            steps,
            calls: AtomicUsize::new(0),
            references: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// References passed to each fetch, in order.
    pub fn references(&self) -> Vec<String> {
        self.references.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckFetcher for ScriptedFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<CheckRun>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.references.lock().unwrap().push(reference.to_string());

        let step = self
            .steps
            .get(call)
            .or_else(|| self.steps.last())
            .ok_or_else(|| WaitError::Transport("no scripted snapshots".to_string()))?;

        match step {
            FetchStep::Snapshot(checks) => Ok(checks.clone()),
            FetchStep::Fail(message) => Err(WaitError::Transport(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records every line it would have printed.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// All lines joined with newlines, like captured stdout.
    pub fn output(&self) -> String {
        let mut out = self.lines().join("\n");
        out.push('\n');
        out
    }

    fn push(&self, lines: impl IntoIterator<Item = String>) {
        self.lines.lock().unwrap().extend(lines);
    }
}

impl Reporter for RecordingReporter {
    fn waiting(&self, total: usize, interval: Duration) {
        self.push([waiting_line(total, interval)]);
    }

    fn completed(&self, checks: &[CheckRun]) {
        self.push(completed_lines(checks));
    }

    fn none_matched(&self, verdict: &Verdict) {
        self.push([verdict.message().to_string()]);
    }
}
