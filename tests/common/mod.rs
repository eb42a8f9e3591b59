//! Shared test helpers

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::{MockJobDispatcher, MockPlatformService};

use greenmerge::bot::MergeBot;
use greenmerge::registry::AttemptRegistry;
use greenmerge::types::{MergeableState, PrRef, PrState, PullRequestSnapshot};
use std::sync::Arc;

pub const OWNER: &str = "octo";
pub const REPO: &str = "widgets";

/// Reference to `octo/widgets#<number>`
pub fn pr_ref(number: u64) -> PrRef {
    PrRef::new(OWNER, REPO, number)
}

/// An open PR snapshot in `octo/widgets`
pub fn make_snapshot(
    number: u64,
    mergeable: Option<bool>,
    mergeable_state: MergeableState,
) -> PullRequestSnapshot {
    let sha = format!("head{number:04}");
    PullRequestSnapshot {
        number,
        title: format!("Change {number}"),
        body: Some("Does a thing".to_string()),
        state: PrState::Open,
        merged: false,
        mergeable,
        mergeable_state,
        head_sha: sha.clone(),
        base_repo_full_name: format!("{OWNER}/{REPO}"),
        base_repo_url: format!("https://api.github.com/repos/{OWNER}/{REPO}"),
        statuses_url: format!("https://api.github.com/repos/{OWNER}/{REPO}/statuses/{sha}"),
    }
}

/// A clean, mergeable snapshot
pub fn clean_snapshot(number: u64) -> PullRequestSnapshot {
    make_snapshot(number, Some(true), MergeableState::Clean)
}

/// Bot over a fresh in-memory registry, returning the mock too
pub fn make_bot() -> (Arc<MockPlatformService>, MergeBot) {
    let mock = Arc::new(MockPlatformService::new());
    let bot = MergeBot::new(mock.clone(), AttemptRegistry::in_memory());
    (mock, bot)
}
