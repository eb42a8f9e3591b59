//! CI job dispatch capability
//!
//! The bot does not know how to talk to any particular CI system. Whoever
//! wires it up supplies a [`JobDispatcher`]; once the job is accepted, the
//! CI system is expected to report its result as a commit status on the
//! dispatched SHA, which the merge evaluator then sees in the combined status.

use crate::error::Result;
use async_trait::async_trait;

/// Something that can start a named CI job for a commit
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Ask the CI system to run `job` against `sha` in `repository`
    ///
    /// Returns once the job is accepted, not when it finishes. `repository`
    /// is `owner/repo`.
    async fn dispatch(&self, repository: &str, job: &str, sha: &str) -> Result<()>;
}
