//! Merge engine
//!
//! Same split as elsewhere in the crate:
//! 1. Plan - classify a PR snapshot (pure, testable)
//! 2. Commit - compose the merge commit (pure)
//! 3. Execute - one evaluation pass against the platform (effectful)
//! 4. Orchestrate - run a CI job first, then hand off to monitoring

mod commit;
mod execute;
mod orchestrate;
mod plan;

pub use commit::{WRAP_WIDTH, compose, compose_commit_message, strip_after_rule, wrap};
pub use execute::{
    DEFAULT_TIMEOUT_MINUTES, MergeEvaluator, PassOutcome, WaitReason, merge_failure_diagnostic,
};
pub use orchestrate::run_then_merge;
pub use plan::{MergeDecision, Rejection, StatusDecision, decide, decide_for, decide_on_status};
