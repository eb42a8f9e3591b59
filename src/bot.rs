//! The merge bot service
//!
//! Wires a platform, an attempt registry and an evaluator together and
//! exposes the two entry points a webhook router calls: "merge when green"
//! and "run job X, then merge".

use crate::dispatch::JobDispatcher;
use crate::error::Result;
use crate::merge::{MergeEvaluator, PassOutcome, run_then_merge};
use crate::platform::PlatformService;
use crate::registry::AttemptRegistry;
use crate::types::{MergeAttempt, PrRef};
use chrono::Duration;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};

/// Merge bot service
///
/// Cheap to clone; clones share the platform and registry.
#[derive(Clone)]
pub struct MergeBot {
    platform: Arc<dyn PlatformService>,
    evaluator: MergeEvaluator,
}

impl MergeBot {
    /// Create a bot with the default timeout
    pub fn new(platform: Arc<dyn PlatformService>, registry: AttemptRegistry) -> Self {
        let evaluator = MergeEvaluator::new(Arc::clone(&platform), registry);
        Self {
            platform,
            evaluator,
        }
    }

    /// Override how long an attempt may stay pending
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.evaluator = self.evaluator.with_timeout(timeout);
        self
    }

    /// Pending attempts
    pub const fn registry(&self) -> &AttemptRegistry {
        self.evaluator.registry()
    }

    /// The evaluator used for every pass
    pub const fn evaluator(&self) -> &MergeEvaluator {
        &self.evaluator
    }

    /// Start monitoring `pr` and run the first evaluation pass
    ///
    /// Replaces any pending attempt for the same PR. Returns the outcome of
    /// the first pass, or `None` if that pass failed (the attempt then stays
    /// registered for the scheduler).
    pub async fn begin_green_merge(&self, pr: PrRef) -> Option<PassOutcome> {
        let attempt = self.registry().register(pr);
        self.evaluator
            .evaluate(&attempt)
            .instrument(info_span!("green_merge", pr = %attempt.pr))
            .await
    }

    /// Fire-and-continue variant of [`begin_green_merge`](Self::begin_green_merge)
    pub fn spawn_green_merge(&self, pr: PrRef) -> JoinHandle<Option<PassOutcome>> {
        let bot = self.clone();
        tokio::spawn(async move { bot.begin_green_merge(pr).await })
    }

    /// Dispatch a CI job for `pr`, then register it for monitoring
    ///
    /// No evaluation pass runs here; the job has only just been queued. A
    /// dispatch failure is returned and nothing is registered.
    pub async fn begin_run_then_merge(
        &self,
        dispatcher: &dyn JobDispatcher,
        pr: PrRef,
        job: &str,
    ) -> Result<MergeAttempt> {
        run_then_merge(
            self.platform.as_ref(),
            self.registry(),
            dispatcher,
            &pr,
            job,
        )
        .instrument(info_span!("run_then_merge", pr = %pr, job))
        .await
    }

    /// Fire-and-continue variant of [`begin_run_then_merge`](Self::begin_run_then_merge)
    pub fn spawn_run_then_merge(
        &self,
        dispatcher: Arc<dyn JobDispatcher>,
        pr: PrRef,
        job: String,
    ) -> JoinHandle<Result<MergeAttempt>> {
        let bot = self.clone();
        tokio::spawn(async move {
            bot.begin_run_then_merge(dispatcher.as_ref(), pr, &job)
                .await
        })
    }

    /// Re-evaluate one PR if it has a pending attempt
    ///
    /// Hook for status webhooks: when CI reports on a PR's head commit the
    /// router can call this instead of waiting for the next scheduler tick.
    pub async fn reevaluate(&self, pr: &PrRef) -> Option<PassOutcome> {
        let Some(attempt) = self.registry().get(pr) else {
            debug!(%pr, "no pending attempt");
            return None;
        };
        self.evaluator.evaluate(&attempt).await
    }

    /// Run one pass over every pending attempt, oldest first
    pub async fn evaluate_pending(&self) -> Vec<(PrRef, Option<PassOutcome>)> {
        let mut results = Vec::new();
        for attempt in self.registry().pending() {
            let outcome = self.evaluator.evaluate(&attempt).await;
            results.push((attempt.pr, outcome));
        }
        results
    }
}
