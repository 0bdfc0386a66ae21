//! checkwait - block a CI job until sibling check runs finish
//!
//! Every option can also be supplied through the environment variable shown
//! in `--help`, which is how the tool is usually wired into a workflow step.
//!
//! Exit status is 0 when every relevant check completed with an allowed
//! conclusion (or nothing matched and that was allowed), 1 otherwise.

use anyhow::{Context, Result};
use checkwait_core::{
    init_tracing, Reconciler, StdoutReporter, Verdict, WaitConfig, WaitOutcome,
    DEFAULT_POLL_INTERVAL_SECS,
};
use checkwait_github::{GithubClient, GithubConfig};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "checkwait")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wait for GitHub check runs on a ref to finish", long_about = None)]
struct Cli {
    /// Commit SHA or branch whose checks to wait for
    #[arg(long = "ref", env = "REF")]
    reference: String,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// Access token for the GitHub API
    #[arg(long, env = "REPO_TOKEN", hide_env_values = true, default_value = "")]
    token: String,

    /// API base URL override (GitHub Enterprise); blank means api.github.com
    #[arg(long, env = "API_ENDPOINT", default_value = "")]
    api_endpoint: String,

    /// Only wait for the check with this exact name
    #[arg(long, env = "CHECK_NAME")]
    check_name: Option<String>,

    /// Only wait for checks whose name matches this regular expression
    #[arg(long, env = "CHECK_REGEXP")]
    check_regexp: Option<String>,

    /// Name of the check running this tool; always excluded
    #[arg(long, env = "RUNNING_WORKFLOW_NAME")]
    running_workflow_name: Option<String>,

    /// Comma-separated check names to ignore
    #[arg(long, env = "IGNORE_CHECKS", default_value = "")]
    ignore_checks: String,

    /// Seconds between polls
    #[arg(long, env = "WAIT_INTERVAL", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    wait_interval: u64,

    /// Comma-separated conclusions that count as passing
    #[arg(long, env = "ALLOWED_CONCLUSIONS", default_value = "success,skipped")]
    allowed_conclusions: String,

    /// Fail when no checks match the filters
    #[arg(
        long,
        env = "FAIL_ON_NO_CHECKS",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    fail_on_no_checks: bool,

    /// Enable verbose output
    #[arg(
        short,
        long,
        env = "VERBOSE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn wait_config(&self) -> WaitConfig {
        let mut config = WaitConfig::new()
            .with_ignored(split_list(&self.ignore_checks))
            .with_allowed_conclusions(split_list(&self.allowed_conclusions))
            .with_fail_on_no_checks(self.fail_on_no_checks)
            .with_poll_interval(Duration::from_secs(self.wait_interval));

        if let Some(name) = &self.running_workflow_name {
            config = config.with_self_name(name.as_str());
        }
        if let Some(name) = &self.check_name {
            config = config.with_include_name(name.as_str());
        }
        if let Some(pattern) = &self.check_regexp {
            config = config.with_include_pattern(pattern.as_str());
        }
        config
    }

    fn github_config(&self) -> GithubConfig {
        GithubConfig::new(self.repo.trim())
            .with_endpoint(&self.api_endpoint)
            .with_token(&self.token)
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

async fn run(cli: &Cli) -> Result<WaitOutcome> {
    let config = cli.wait_config();
    debug!(?config, "resolved configuration");

    let client = GithubClient::new(cli.github_config()).context("Failed to create GitHub client")?;
    let reconciler = Reconciler::new(config, Arc::new(client), Arc::new(StdoutReporter))?;

    Ok(reconciler.wait_for(cli.reference.trim()).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(outcome) => {
            if let Verdict::AllPassed { checks } = &outcome.verdict {
                debug!(
                    checks = checks.len(),
                    polls = outcome.polls,
                    elapsed_secs = (outcome.finished_at - outcome.started_at).num_seconds(),
                    "wait finished"
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
