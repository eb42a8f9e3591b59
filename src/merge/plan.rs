//! Merge planning - pure functions deciding what to do with a pull request
//!
//! No I/O happens here. The evaluator fetches the PR (and, when asked to,
//! the combined status) and feeds the results in.

use crate::types::{CombinedState, MergeableState, PullRequestSnapshot};
use std::fmt;

/// What the mergeability fields alone say about a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Mergeable and clean - submit the merge now
    MergeNow,
    /// Mergeable but not clean - the combined status decides
    CheckStatus,
    /// GitHub reports conflicts
    NotMergeable,
    /// GitHub has not computed mergeability yet
    NotComputed,
}

/// What the combined status says once `CheckStatus` was returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDecision {
    /// Checks still running
    Wait,
    /// Checks passed yet the PR is not clean (reviews, branch protection, ...)
    Blocked,
    /// Checks failed or errored
    ChecksFailed,
}

/// Why an attempt was abandoned without merging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Merge conflicts
    NotMergeable,
    /// Checks passed but GitHub still will not merge
    Blocked,
    /// Required checks failed
    ChecksFailed,
}

impl Rejection {
    /// Comment posted on the PR for this rejection
    pub const fn diagnostic(self) -> &'static str {
        match self {
            Self::NotMergeable => {
                "This pull request is not mergeable. Please resolve the merge conflicts and try again."
            }
            Self::Blocked => {
                "Merge is blocked even though all status checks passed. Please resolve whatever is blocking it and try again."
            }
            Self::ChecksFailed => "Required status checks failed, aborting merge.",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMergeable => write!(f, "not mergeable"),
            Self::Blocked => write!(f, "blocked"),
            Self::ChecksFailed => write!(f, "checks failed"),
        }
    }
}

impl StatusDecision {
    /// The rejection this decision ends in, if it is terminal
    pub const fn rejection(self) -> Option<Rejection> {
        match self {
            Self::Wait => None,
            Self::Blocked => Some(Rejection::Blocked),
            Self::ChecksFailed => Some(Rejection::ChecksFailed),
        }
    }
}

/// Classify a pull request from its mergeability fields
///
/// | mergeable | state     | decision      |
/// |-----------|-----------|---------------|
/// | true      | clean     | `MergeNow`    |
/// | true      | not clean | `CheckStatus` |
/// | false     | any       | `NotMergeable`|
/// | null      | any       | `NotComputed` |
pub const fn decide(mergeable: Option<bool>, state: MergeableState) -> MergeDecision {
    match (mergeable, state) {
        (Some(true), MergeableState::Clean) => MergeDecision::MergeNow,
        (Some(true), _) => MergeDecision::CheckStatus,
        (Some(false), _) => MergeDecision::NotMergeable,
        (None, _) => MergeDecision::NotComputed,
    }
}

/// Classify a snapshot (see [`decide`])
pub const fn decide_for(pr: &PullRequestSnapshot) -> MergeDecision {
    decide(pr.mergeable, pr.mergeable_state)
}

/// Secondary check after [`MergeDecision::CheckStatus`]
pub const fn decide_on_status(status: CombinedState) -> StatusDecision {
    match status {
        CombinedState::Pending => StatusDecision::Wait,
        CombinedState::Success => StatusDecision::Blocked,
        CombinedState::Failure | CombinedState::Error => StatusDecision::ChecksFailed,
    }
}
