//! checkwait core - check-run reconciliation engine
//!
//! Blocks until the check runs relevant to a caller finish, then decides
//! whether their conclusions are acceptable:
//! - [`filter`] narrows each snapshot (self-exclusion, exact name, pattern)
//! - [`reconcile`] polls a [`CheckFetcher`] until every relevant check is completed
//! - [`verdict`] handles the empty-snapshot decision and the conclusion allow-list

pub mod check;
pub mod config;
pub mod error;
pub mod fakes;
pub mod filter;
pub mod reconcile;
pub mod report;
pub mod telemetry;
pub mod verdict;

// Re-export key types
pub use check::{all_completed, CheckRun, CheckStatus, Conclusion};
pub use config::{CompiledFilters, WaitConfig, DEFAULT_POLL_INTERVAL_SECS};
pub use error::{Result, WaitError};
pub use filter::FilterPipeline;
pub use reconcile::{CheckFetcher, Reconciler, WaitOutcome};
pub use report::{Reporter, StdoutReporter};
pub use telemetry::init_tracing;
pub use verdict::{classify_presence, evaluate_conclusions, CheckPresence, EmptyReason, Verdict};
