//! Merge evaluation - effectful operations
//!
//! One call to [`MergeEvaluator::evaluate`] is one pass over a pending
//! attempt: fetch the PR, enforce the timeout, classify it with the pure
//! functions in `plan`, then merge, comment, or leave it waiting. Terminal
//! outcomes remove the attempt from the registry; waiting leaves it there
//! for the scheduler to pick up again.

use crate::error::Result;
use crate::merge::commit::compose_commit_message;
use crate::merge::plan::{MergeDecision, Rejection, decide_for, decide_on_status};
use crate::platform::PlatformService;
use crate::registry::AttemptRegistry;
use crate::types::{MergeAttempt, MergeFailure, MergeSubmission, PrRef};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default time an attempt may stay pending before it is abandoned
pub const DEFAULT_TIMEOUT_MINUTES: i64 = 60;

/// Why an attempt is still waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// GitHub has not computed mergeability yet
    NotComputed,
    /// Mergeable but not clean, and checks are still running
    ChecksPending,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The PR was merged
    Merged {
        /// SHA of the merge commit
        sha: Option<String>,
    },
    /// Abandoned because of the PR's merge state
    Rejected(Rejection),
    /// GitHub refused the merge request
    MergeFailed(MergeFailure),
    /// Pending for longer than the timeout
    TimedOut,
    /// Closed or merged by someone else
    Closed,
    /// Still waiting; evaluate again later
    Waiting(WaitReason),
}

impl PassOutcome {
    /// Whether the attempt is finished
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting(_))
    }
}

/// Comment text for a refused merge
///
/// A 409 means the head branch moved, and GitHub's message says so better
/// than we can. Otherwise prefer the documentation link, then the message,
/// then whatever came back.
pub fn merge_failure_diagnostic(failure: &MergeFailure) -> String {
    if failure.is_conflict()
        && let Some(message) = &failure.message
    {
        return message.clone();
    }
    if let Some(url) = &failure.documentation_url {
        return format!("Merge failed, see {url}");
    }
    if let Some(message) = &failure.message {
        return format!("Merge failed: {message}");
    }
    format!(
        "Merge failed (HTTP {}):\n\n```\n{}\n```",
        failure.status, failure.raw
    )
}

/// Runs evaluation passes against a platform
#[derive(Clone)]
pub struct MergeEvaluator {
    platform: Arc<dyn PlatformService>,
    registry: AttemptRegistry,
    timeout: Duration,
}

impl MergeEvaluator {
    /// Create an evaluator with the default 60 minute timeout
    pub fn new(platform: Arc<dyn PlatformService>, registry: AttemptRegistry) -> Self {
        Self {
            platform,
            registry,
            timeout: Duration::minutes(DEFAULT_TIMEOUT_MINUTES),
        }
    }

    /// Override the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured timeout
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The registry this evaluator resolves attempts in
    pub const fn registry(&self) -> &AttemptRegistry {
        &self.registry
    }

    /// Run one pass, logging instead of returning errors
    ///
    /// On error the attempt is left exactly as it was and `None` is returned,
    /// unless the attempt has also run past its timeout: then it times out
    /// here, so an unreachable PR cannot stay pending forever.
    pub async fn evaluate(&self, attempt: &MergeAttempt) -> Option<PassOutcome> {
        match self.try_evaluate(attempt).await {
            Ok(outcome) => Some(outcome),
            Err(e) if self.is_expired(attempt) => {
                warn!(pr = %attempt.pr, error = %e, "evaluation pass failed after timeout");
                Some(self.time_out(attempt).await)
            }
            Err(e) => {
                warn!(pr = %attempt.pr, error = %e, "evaluation pass failed");
                None
            }
        }
    }

    /// Run one pass over `attempt`
    pub async fn try_evaluate(&self, attempt: &MergeAttempt) -> Result<PassOutcome> {
        let pr = &attempt.pr;
        let snapshot = self.platform.get_pull_request(pr).await?;

        if snapshot.is_finished() {
            info!(%pr, merged = snapshot.merged, "PR closed outside the bot, dropping attempt");
            self.registry.complete(attempt);
            return Ok(PassOutcome::Closed);
        }

        if self.is_expired(attempt) {
            return Ok(self.time_out(attempt).await);
        }

        let message = compose_commit_message(&snapshot);

        let outcome = match decide_for(&snapshot) {
            MergeDecision::MergeNow => {
                match self
                    .platform
                    .merge_pull_request(pr, &message, &snapshot.head_sha)
                    .await?
                {
                    MergeSubmission::Merged { sha } => {
                        info!(%pr, sha = ?sha, "merged");
                        PassOutcome::Merged { sha }
                    }
                    MergeSubmission::Rejected(failure) => {
                        info!(%pr, status = failure.status, "merge refused");
                        self.notify(pr, &merge_failure_diagnostic(&failure)).await;
                        PassOutcome::MergeFailed(failure)
                    }
                }
            }
            MergeDecision::CheckStatus => {
                let status = self.platform.get_combined_status(&snapshot).await?;
                debug!(%pr, %status, mergeable_state = %snapshot.mergeable_state, "checked combined status");
                match decide_on_status(status).rejection() {
                    None => PassOutcome::Waiting(WaitReason::ChecksPending),
                    Some(rejection) => self.reject(pr, rejection).await,
                }
            }
            MergeDecision::NotMergeable => self.reject(pr, Rejection::NotMergeable).await,
            MergeDecision::NotComputed => PassOutcome::Waiting(WaitReason::NotComputed),
        };

        if outcome.is_terminal() {
            self.registry.complete(attempt);
        } else {
            debug!(%pr, ?outcome, "still waiting");
        }
        Ok(outcome)
    }

    fn is_expired(&self, attempt: &MergeAttempt) -> bool {
        Utc::now() - attempt.started_at > self.timeout
    }

    async fn time_out(&self, attempt: &MergeAttempt) -> PassOutcome {
        let pr = &attempt.pr;
        info!(%pr, started_at = %attempt.started_at, "attempt timed out");
        self.notify(
            pr,
            &format!(
                "Gave up waiting for this pull request to become mergeable after {} minutes.",
                self.timeout.num_minutes()
            ),
        )
        .await;
        self.registry.complete(attempt);
        PassOutcome::TimedOut
    }

    async fn reject(&self, pr: &PrRef, rejection: Rejection) -> PassOutcome {
        info!(%pr, %rejection, "abandoning merge");
        self.notify(pr, rejection.diagnostic()).await;
        PassOutcome::Rejected(rejection)
    }

    /// Post a comment, logging failures; the outcome never depends on it
    async fn notify(&self, pr: &PrRef, body: &str) {
        if let Err(e) = self.platform.create_comment(pr, body).await {
            warn!(%pr, error = %e, "failed to post comment");
        }
    }
}
