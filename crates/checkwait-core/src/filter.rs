//! Filter pipeline: narrows a raw snapshot to the checks the caller cares about.
//!
//! Stages run in a fixed order and compose with AND semantics:
//! 1. self-exclusion (own name and ignored names)
//! 2. exact-name inclusion
//! 3. pattern inclusion
//!
//! Each stage only removes entries; surviving checks keep their input order.

use crate::check::CheckRun;
use crate::config::CompiledFilters;
use tracing::debug;

/// Stateless filter pipeline over compiled filters.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    filters: CompiledFilters,
}

impl FilterPipeline {
    pub fn new(filters: CompiledFilters) -> Self {
        Self { filters }
    }

    /// Apply every stage to a snapshot.
    pub fn apply(&self, checks: Vec<CheckRun>) -> Vec<CheckRun> {
        let checks = self.exclude_self(checks);
        let checks = self.include_exact(checks);
        self.include_matching(checks)
    }

    /// Stage 1: drop the invoking check and ignored names.
    ///
    /// Must run first, otherwise the invoking check (still in progress while
    /// we wait) keeps the loop from ever terminating.
    pub fn exclude_self(&self, mut checks: Vec<CheckRun>) -> Vec<CheckRun> {
        checks.retain(|check| !self.filters.excluded.contains(&check.name));
        debug!(stage = "exclude_self", surviving = checks.len(), "filter stage applied");
        checks
    }

    /// Stage 2: keep only the exact name, when one is configured.
    pub fn include_exact(&self, mut checks: Vec<CheckRun>) -> Vec<CheckRun> {
        if let Some(name) = &self.filters.include_name {
            checks.retain(|check| &check.name == name);
            debug!(stage = "include_name", surviving = checks.len(), "filter stage applied");
        }
        checks
    }

    /// Stage 3: keep only names the pattern finds a match in.
    pub fn include_matching(&self, mut checks: Vec<CheckRun>) -> Vec<CheckRun> {
        if let Some(pattern) = &self.filters.pattern {
            checks.retain(|check| pattern.is_match(&check.name));
            debug!(stage = "include_pattern", surviving = checks.len(), "filter stage applied");
        }
        checks
    }
}
