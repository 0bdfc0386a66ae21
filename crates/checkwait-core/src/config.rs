//! Caller-supplied configuration for one wait invocation.

use crate::check::Conclusion;
use crate::error::{Result, WaitError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default seconds between polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Filter and acceptance configuration.
///
/// Read-only for the lifetime of a [`crate::Reconciler`]; the loop never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitConfig {
    /// Name of the invoking check. Always excluded.
    pub self_name: Option<String>,

    /// Names excluded outright.
    pub ignore_names: BTreeSet<String>,

    /// Exact-match inclusion filter.
    pub include_name: Option<String>,

    /// Regular-expression inclusion filter (search semantics).
    pub include_pattern: Option<String>,

    /// Conclusions treated as acceptable.
    pub allowed_conclusions: Vec<Conclusion>,

    /// Whether an empty first snapshot is a failure.
    pub fail_on_no_checks: bool,

    /// Delay between polls.
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            self_name: None,
            ignore_names: BTreeSet::new(),
            include_name: None,
            include_pattern: None,
            allowed_conclusions: Conclusion::default_allowed(),
            fail_on_no_checks: true,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl WaitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self_name(mut self, name: impl Into<String>) -> Self {
        self.self_name = Some(name.into());
        self
    }

    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_include_name(mut self, name: impl Into<String>) -> Self {
        self.include_name = Some(name.into());
        self
    }

    pub fn with_include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.include_pattern = Some(pattern.into());
        self
    }

    pub fn with_allowed_conclusions<I, C>(mut self, conclusions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Conclusion>,
    {
        self.allowed_conclusions = conclusions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fail_on_no_checks(mut self, fail: bool) -> Self {
        self.fail_on_no_checks = fail;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Whether the caller asked for specific checks (by name or pattern).
    pub fn has_targeting_filter(&self) -> bool {
        non_blank(self.include_name.as_deref()).is_some()
            || non_blank(self.include_pattern.as_deref()).is_some()
    }

    /// Validate inputs and compile the pattern.
    ///
    /// Fails fast on an invalid regular expression or an empty allow-list so
    /// that no fetch happens with a configuration that can never succeed.
    pub fn validate(&self) -> Result<CompiledFilters> {
        if self.allowed_conclusions.is_empty() {
            return Err(WaitError::Configuration(
                "allowed conclusions must not be empty".to_string(),
            ));
        }

        let pattern = non_blank(self.include_pattern.as_deref())
            .map(Regex::new)
            .transpose()?;

        let mut excluded = self.ignore_names.clone();
        if let Some(name) = non_blank(self.self_name.as_deref()) {
            excluded.insert(name.to_string());
        }

        Ok(CompiledFilters {
            excluded,
            include_name: non_blank(self.include_name.as_deref()).map(str::to_string),
            pattern,
        })
    }
}

/// Validated, ready-to-apply filters derived from a [`WaitConfig`].
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    pub(crate) excluded: BTreeSet<String>,
    pub(crate) include_name: Option<String>,
    pub(crate) pattern: Option<Regex>,
}

impl CompiledFilters {
    /// Names removed by self-exclusion.
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }
}

/// Treat empty and whitespace-only strings as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WaitConfig::default();
        assert_eq!(
            config.allowed_conclusions,
            vec![Conclusion::Success, Conclusion::Skipped]
        );
        assert!(config.fail_on_no_checks);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(!config.has_targeting_filter());
    }

    #[test]
    fn test_validate_merges_self_name_into_exclusions() {
        let filters = WaitConfig::new()
            .with_self_name("invoking_check")
            .with_ignored(["docs", "lint"])
            .validate()
            .expect("valid config");

        let excluded: Vec<_> = filters.excluded().iter().cloned().collect();
        assert_eq!(excluded, vec!["docs", "invoking_check", "lint"]);
    }

    #[test]
    fn test_validate_rejects_invalid_pattern() {
        let err = WaitConfig::new()
            .with_include_pattern("build-(")
            .validate()
            .unwrap_err();
        assert!(matches!(err, WaitError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_empty_allow_list() {
        let err = WaitConfig::new()
            .with_allowed_conclusions(Vec::<String>::new())
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("allowed conclusions"));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let config = WaitConfig::new()
            .with_include_name("")
            .with_include_pattern("   ");
        assert!(!config.has_targeting_filter());

        let filters = config.validate().unwrap();
        assert!(filters.include_name.is_none());
        assert!(filters.pattern.is_none());
    }

    #[test]
    fn test_targeting_filter_detected() {
        assert!(WaitConfig::new().with_include_name("build").has_targeting_filter());
        assert!(WaitConfig::new().with_include_pattern("^test").has_targeting_filter());
    }
}
