//! Platform services
//!
//! The merge evaluator only talks to source control through
//! [`PlatformService`], so it can be driven by GitHub or by a test double.

mod github;

pub use github::{DEFAULT_API_BASE, GitHubService, combined_status_url, repository_name_from_url};

use crate::error::Result;
use crate::types::{CombinedState, CommitMessage, MergeSubmission, PrRef, PullRequestSnapshot};
use async_trait::async_trait;

/// Platform service trait for the pull request operations the bot needs
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch the current state of a PR
    async fn get_pull_request(&self, pr: &PrRef) -> Result<PullRequestSnapshot>;

    /// Submit a merge pinned to `head_sha`
    ///
    /// A refusal from the platform (conflict, branch protection, ...) is
    /// `Ok(MergeSubmission::Rejected)`. `Err` means the request itself failed.
    async fn merge_pull_request(
        &self,
        pr: &PrRef,
        message: &CommitMessage,
        head_sha: &str,
    ) -> Result<MergeSubmission>;

    /// Post a comment on a PR
    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()>;

    /// Combined CI status of the PR's head commit
    async fn get_combined_status(&self, pr: &PullRequestSnapshot) -> Result<CombinedState>;

    /// API root, e.g. `https://api.github.com`
    fn api_base(&self) -> &str;
}
