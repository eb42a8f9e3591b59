//! In-process attempt storage

use super::AttemptStore;
use crate::types::{MergeAttempt, PrRef};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// `AttemptStore` over a mutex-guarded map
///
/// Attempts are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    attempts: Mutex<HashMap<PrRef, MergeAttempt>>,
}

impl InMemoryAttemptStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PrRef, MergeAttempt>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn get(&self, pr: &PrRef) -> Option<MergeAttempt> {
        self.lock().get(pr).cloned()
    }

    fn put(&self, attempt: MergeAttempt) -> Option<MergeAttempt> {
        self.lock().insert(attempt.pr.clone(), attempt)
    }

    fn remove_if_current(&self, attempt: &MergeAttempt) -> bool {
        match self.lock().entry(attempt.pr.clone()) {
            Entry::Occupied(entry) if entry.get() == attempt => {
                entry.remove();
                true
            }
            _ => false,
        }
    }

    fn remove(&self, pr: &PrRef) -> Option<MergeAttempt> {
        self.lock().remove(pr)
    }

    fn list(&self) -> Vec<MergeAttempt> {
        self.lock().values().cloned().collect()
    }
}
