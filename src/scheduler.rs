//! Periodic re-evaluation of pending attempts
//!
//! Evaluation passes are idempotent, so the scheduler simply walks the
//! registry on a fixed interval. Status webhooks can shortcut the wait via
//! [`MergeBot::reevaluate`].

use crate::bot::MergeBot;
use crate::merge::PassOutcome;
use crate::types::PrRef;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Default interval between passes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Drives evaluation passes for everything in the registry
pub struct Scheduler {
    bot: MergeBot,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler polling every `interval`
    pub const fn new(bot: MergeBot, interval: Duration) -> Self {
        Self { bot, interval }
    }

    /// Interval between passes
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Evaluate every pending attempt once
    ///
    /// Returns each evaluated PR with its outcome (`None` if the pass failed).
    pub async fn tick(&self) -> Vec<(PrRef, Option<PassOutcome>)> {
        let results = self.bot.evaluate_pending().await;
        let resolved = results
            .iter()
            .filter(|(_, outcome)| outcome.as_ref().is_some_and(|o| o.is_terminal()))
            .count();
        debug!(
            evaluated = results.len(),
            resolved,
            remaining = self.bot.registry().len(),
            "scheduler tick"
        );
        results
    }

    /// Tick until `shutdown` flips to `true` (or its sender is dropped)
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so a fresh attempt
        // is not evaluated twice in a row
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("scheduler stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Tick until the registry is empty
    ///
    /// Returns the terminal outcomes reached along the way.
    pub async fn run_until_idle(&self) -> Vec<(PrRef, PassOutcome)> {
        let mut resolved = Vec::new();
        while !self.bot.registry().is_empty() {
            tokio::time::sleep(self.interval).await;
            resolved.extend(self.tick().await.into_iter().filter_map(|(pr, outcome)| {
                outcome.filter(PassOutcome::is_terminal).map(|o| (pr, o))
            }));
        }
        debug!("no pending attempts left");
        resolved
    }
}
