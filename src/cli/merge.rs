//! Merge command - wait for a PR to go green, then merge it

use crate::cli::context::CommandContext;
use greenmerge::bot::MergeBot;
use greenmerge::config::load_config;
use greenmerge::error::{Error, Result};
use greenmerge::merge::{PassOutcome, WaitReason, merge_failure_diagnostic};
use greenmerge::registry::AttemptRegistry;
use greenmerge::scheduler::Scheduler;
use greenmerge::types::PrRef;
use std::path::Path;
use tracing::info;

/// Flags overriding the config file
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Overrides `timeout_minutes`
    pub timeout_minutes: Option<i64>,
    /// Overrides `poll_interval_secs`
    pub poll_interval_secs: Option<u64>,
}

/// Run the merge command
///
/// Returns an error when the PR ends up unmerged, so the exit code reflects
/// the result.
pub async fn run_merge(config_path: Option<&Path>, pr: &str, options: MergeOptions) -> Result<()> {
    let pr: PrRef = pr.parse()?;

    let mut config = load_config(config_path)?;
    if let Some(minutes) = options.timeout_minutes {
        config.timeout_minutes = minutes;
    }
    if let Some(secs) = options.poll_interval_secs {
        config.poll_interval_secs = secs;
    }
    config.validate()?;

    let ctx = CommandContext::new(config).await?;

    let bot = MergeBot::new(ctx.platform, AttemptRegistry::in_memory())
        .with_timeout(ctx.config.timeout());

    let outcome = match bot.begin_green_merge(pr.clone()).await {
        Some(outcome) if outcome.is_terminal() => outcome,
        first => {
            if let Some(PassOutcome::Waiting(reason)) = &first {
                println!("{pr}: {}", describe_wait(*reason));
            }
            let scheduler = Scheduler::new(bot.clone(), ctx.config.poll_interval());
            tokio::select! {
                resolved = scheduler.run_until_idle() => {
                    resolved
                        .into_iter()
                        .find_map(|(resolved_pr, outcome)| (resolved_pr == pr).then_some(outcome))
                        .ok_or_else(|| Error::Internal(format!("{pr} left the registry without an outcome")))?
                }
                _ = tokio::signal::ctrl_c() => {
                    bot.registry().cancel(&pr);
                    info!(%pr, "interrupted, attempt cancelled");
                    return Err(Error::Internal("interrupted".to_string()));
                }
            }
        }
    };

    report(&pr, &outcome)
}

const fn describe_wait(reason: WaitReason) -> &'static str {
    match reason {
        WaitReason::NotComputed => "waiting for GitHub to compute mergeability",
        WaitReason::ChecksPending => "waiting for status checks",
    }
}

fn report(pr: &PrRef, outcome: &PassOutcome) -> Result<()> {
    match outcome {
        PassOutcome::Merged { sha } => {
            match sha {
                Some(sha) => println!("{pr}: merged as {sha}"),
                None => println!("{pr}: merged"),
            }
            Ok(())
        }
        PassOutcome::Closed => {
            println!("{pr}: closed or already merged, nothing to do");
            Ok(())
        }
        PassOutcome::Rejected(rejection) => Err(Error::Platform(format!("{pr}: {rejection}"))),
        PassOutcome::MergeFailed(failure) => Err(Error::Platform(format!(
            "{pr}: {}",
            merge_failure_diagnostic(failure)
        ))),
        PassOutcome::TimedOut => Err(Error::Platform(format!(
            "{pr}: gave up waiting for it to become mergeable"
        ))),
        PassOutcome::Waiting(reason) => Err(Error::Internal(format!(
            "{pr}: still {}",
            describe_wait(*reason)
        ))),
    }
}
