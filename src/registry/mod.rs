//! Registry of in-flight merge attempts
//!
//! An attempt present in the registry means "evaluation pending, re-invoke
//! me". Absence means the PR was never started or has resolved. At most one
//! attempt exists per pull request; registering again replaces the old one
//! and restarts its timeout clock.

mod memory;

pub use memory::InMemoryAttemptStore;

use crate::types::{MergeAttempt, PrRef};
use std::sync::Arc;
use tracing::debug;

/// Storage backend for the attempt registry
///
/// Every method is a single atomic step, so concurrent registrations and
/// evaluation passes for the same PR cannot interleave inside one update.
pub trait AttemptStore: Send + Sync {
    /// Look up the attempt for a PR
    fn get(&self, pr: &PrRef) -> Option<MergeAttempt>;

    /// Insert or replace the attempt for its PR, returning the replaced one
    fn put(&self, attempt: MergeAttempt) -> Option<MergeAttempt>;

    /// Remove the entry for `attempt.pr` only if it is still `attempt`
    ///
    /// Returns `false` when the entry is missing or was replaced by a newer
    /// registration in the meantime.
    fn remove_if_current(&self, attempt: &MergeAttempt) -> bool;

    /// Remove whatever attempt exists for a PR
    fn remove(&self, pr: &PrRef) -> Option<MergeAttempt>;

    /// Snapshot of all pending attempts
    fn list(&self) -> Vec<MergeAttempt>;
}

/// The attempt registry service
#[derive(Clone)]
pub struct AttemptRegistry {
    store: Arc<dyn AttemptStore>,
}

impl Default for AttemptRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AttemptRegistry {
    /// Create a registry over the given store
    pub fn new(store: Arc<dyn AttemptStore>) -> Self {
        Self { store }
    }

    /// Create a registry backed by an in-process map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAttemptStore::new()))
    }

    /// Start (or restart) monitoring a PR now
    pub fn register(&self, pr: PrRef) -> MergeAttempt {
        let attempt = MergeAttempt::new(pr);
        self.register_attempt(attempt.clone());
        attempt
    }

    /// Store a prepared attempt, replacing any existing one for the same PR
    pub fn register_attempt(&self, attempt: MergeAttempt) {
        let pr = attempt.pr.clone();
        if let Some(previous) = self.store.put(attempt) {
            debug!(%pr, previous_start = %previous.started_at, "replaced pending attempt");
        } else {
            debug!(%pr, "registered attempt");
        }
    }

    /// The pending attempt for a PR, if any
    pub fn get(&self, pr: &PrRef) -> Option<MergeAttempt> {
        self.store.get(pr)
    }

    /// Whether a PR has a pending attempt
    pub fn contains(&self, pr: &PrRef) -> bool {
        self.get(pr).is_some()
    }

    /// Drop a resolved attempt
    ///
    /// Leaves a newer registration for the same PR untouched.
    pub fn complete(&self, attempt: &MergeAttempt) -> bool {
        let removed = self.store.remove_if_current(attempt);
        if removed {
            debug!(pr = %attempt.pr, "attempt resolved");
        } else {
            debug!(pr = %attempt.pr, "attempt already replaced or removed");
        }
        removed
    }

    /// Stop monitoring a PR
    pub fn cancel(&self, pr: &PrRef) -> Option<MergeAttempt> {
        self.store.remove(pr)
    }

    /// All pending attempts, oldest first
    pub fn pending(&self) -> Vec<MergeAttempt> {
        let mut attempts = self.store.list();
        attempts.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        attempts
    }

    /// Number of pending attempts
    pub fn len(&self) -> usize {
        self.store.list().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
