//! Reconciliation loop: poll, filter, wait for terminal state, evaluate.

use crate::check::{all_completed, CheckRun};
use crate::config::WaitConfig;
use crate::error::{Result, WaitError};
use crate::filter::FilterPipeline;
use crate::report::Reporter;
use crate::verdict::{classify_presence, evaluate_conclusions, CheckPresence, Verdict};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of check-run snapshots for a ref.
///
/// Each call must return a complete, fresh snapshot. Any error is fatal to
/// the wait; implementations should not retry internally on our behalf.
#[async_trait]
pub trait CheckFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<CheckRun>>;
}

/// Summary of a finished wait.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub verdict: Verdict,

    /// Number of fetches performed, including the first.
    pub polls: u32,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives fetch → filter → completion check → sleep until the relevant
/// checks are terminal, then applies the conclusion policy.
pub struct Reconciler {
    config: WaitConfig,
    pipeline: FilterPipeline,
    fetcher: Arc<dyn CheckFetcher>,
    reporter: Arc<dyn Reporter>,
}

impl Reconciler {
    /// Build a reconciler, validating the configuration up front.
    ///
    /// An invalid pattern fails here, before any request is made.
    pub fn new(
        config: WaitConfig,
        fetcher: Arc<dyn CheckFetcher>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        let pipeline = FilterPipeline::new(config.validate()?);
        Ok(Self {
            config,
            pipeline,
            fetcher,
            reporter,
        })
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Fetch one snapshot and run it through the filter pipeline.
    ///
    /// Returns the unfiltered count alongside the filtered checks.
    pub async fn query(&self, reference: &str) -> Result<(usize, Vec<CheckRun>)> {
        let raw = self.fetcher.fetch(reference).await?;
        let raw_count = raw.len();
        let filtered = self.pipeline.apply(raw);
        debug!(
            reference = %reference,
            fetched = raw_count,
            relevant = filtered.len(),
            "queried check runs"
        );
        Ok((raw_count, filtered))
    }

    /// Wait for the relevant checks on `reference` and return the verdict.
    pub async fn wait_for(&self, reference: &str) -> Result<WaitOutcome> {
        if reference.trim().is_empty() {
            return Err(WaitError::Configuration(
                "a ref to check is required".to_string(),
            ));
        }

        let started_at = Utc::now();
        info!(reference = %reference, "Waiting for check runs");

        let (raw_count, mut checks) = self.query(reference).await?;
        let mut polls = 1u32;

        // Only a caller asking for specific checks can be told they never ran;
        // in all-checks mode an empty set falls through to the summary.
        let presence = if self.config.has_targeting_filter() {
            classify_presence(raw_count, &checks, self.config.fail_on_no_checks)
        } else {
            CheckPresence::Present
        };

        match presence {
            CheckPresence::Present => {}
            CheckPresence::NoneMatchedFail(reason) => {
                warn!(reference = %reference, ?reason, "no relevant checks found");
                return Err(WaitError::NeverRun { reason });
            }
            CheckPresence::NoneMatchedOk(reason) => {
                let verdict = Verdict::NoneMatched { reason };
                self.reporter.none_matched(&verdict);
                return Ok(WaitOutcome {
                    verdict,
                    polls,
                    started_at,
                    finished_at: Utc::now(),
                });
            }
        }

        while !all_completed(&checks) {
            self.reporter.waiting(checks.len(), self.config.poll_interval);
            tokio::time::sleep(self.config.poll_interval).await;
            checks = self.query(reference).await?.1;
            polls += 1;
        }

        self.reporter.completed(&checks);
        evaluate_conclusions(&checks, &self.config.allowed_conclusions)?;

        info!(reference = %reference, polls, checks = checks.len(), "All checks passed");
        Ok(WaitOutcome {
            verdict: Verdict::AllPassed { checks },
            polls,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
