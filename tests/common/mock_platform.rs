//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use greenmerge::dispatch::JobDispatcher;
use greenmerge::error::{Error, Result};
use greenmerge::platform::{DEFAULT_API_BASE, PlatformService};
use greenmerge::types::{
    CombinedState, CommitMessage, MergeFailure, MergeSubmission, PrRef, PullRequestSnapshot,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Call record for `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub pr_number: u64,
    pub title: String,
    pub body: String,
    pub head_sha: String,
}

/// Call record for `create_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Hand-written rather than generated so responses can be swapped between
/// evaluation passes.
///
/// Features:
/// - Configurable responses per PR number
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    pr_responses: Mutex<HashMap<u64, PullRequestSnapshot>>,
    status_responses: Mutex<HashMap<u64, CombinedState>>,
    merge_responses: Mutex<HashMap<u64, MergeSubmission>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<u64>>,
    status_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    comment_calls: Mutex<Vec<CommentCall>>,
    // Error injection
    error_on_get_pr: Mutex<Option<String>>,
    error_on_status: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create an empty mock
    pub fn new() -> Self {
        Self {
            pr_responses: Mutex::new(HashMap::new()),
            status_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            comment_calls: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(None),
            error_on_status: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            error_on_comment: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `get_pull_request` return an error
    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_combined_status` return an error
    pub fn fail_status(&self, msg: &str) {
        *self.error_on_status.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pull_request` return an error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_comment` return an error
    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear all injected errors
    pub fn clear_failures(&self) {
        *self.error_on_get_pr.lock().unwrap() = None;
        *self.error_on_status.lock().unwrap() = None;
        *self.error_on_merge.lock().unwrap() = None;
        *self.error_on_comment.lock().unwrap() = None;
    }

    // === Response setup ===

    /// Set the snapshot returned for a PR
    pub fn set_pr_response(&self, snapshot: PullRequestSnapshot) {
        self.pr_responses
            .lock()
            .unwrap()
            .insert(snapshot.number, snapshot);
    }

    /// Set the combined status returned for a PR's head commit
    pub fn set_status_response(&self, pr_number: u64, state: CombinedState) {
        self.status_responses
            .lock()
            .unwrap()
            .insert(pr_number, state);
    }

    /// Set the merge result for a PR (defaults to merged with `merged_sha_<n>`)
    pub fn set_merge_response(&self, pr_number: u64, result: MergeSubmission) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    /// Make the merge endpoint refuse a PR
    pub fn set_merge_rejected(
        &self,
        pr_number: u64,
        status: u16,
        message: Option<&str>,
        documentation_url: Option<&str>,
    ) {
        self.set_merge_response(
            pr_number,
            MergeSubmission::Rejected(MergeFailure {
                status,
                message: message.map(ToString::to_string),
                documentation_url: documentation_url.map(ToString::to_string),
                raw: String::new(),
            }),
        );
    }

    // === Call verification methods ===

    /// PR numbers `get_pull_request` was called with
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// PR numbers `get_combined_status` was called with
    pub fn get_status_calls(&self) -> Vec<u64> {
        self.status_calls.lock().unwrap().clone()
    }

    /// All `merge_pull_request` calls
    pub fn get_merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    /// All `create_comment` calls
    pub fn get_comment_calls(&self) -> Vec<CommentCall> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// Assert that exactly one merge was submitted for a PR
    pub fn assert_merged_once(&self, pr_number: u64) {
        let calls = self.get_merge_calls();
        let count = calls.iter().filter(|c| c.pr_number == pr_number).count();
        assert_eq!(
            count, 1,
            "Expected one merge for #{pr_number} but got: {calls:?}"
        );
    }

    /// Assert that no merge was submitted
    pub fn assert_no_merge(&self) {
        let calls = self.get_merge_calls();
        assert!(calls.is_empty(), "Expected no merge but got: {calls:?}");
    }

    /// Assert that exactly one comment was posted, and return its body
    pub fn assert_single_comment(&self, pr_number: u64) -> String {
        let calls = self.get_comment_calls();
        assert_eq!(
            calls.len(),
            1,
            "Expected one comment on #{pr_number} but got: {calls:?}"
        );
        assert_eq!(calls[0].pr_number, pr_number);
        calls[0].body.clone()
    }

    /// Assert that no comment was posted
    pub fn assert_no_comment(&self) {
        let calls = self.get_comment_calls();
        assert!(calls.is_empty(), "Expected no comment but got: {calls:?}");
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pull_request(&self, pr: &PrRef) -> Result<PullRequestSnapshot> {
        self.get_pr_calls.lock().unwrap().push(pr.number);

        if let Some(msg) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.pr_responses
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("no such PR #{}", pr.number)))
    }

    async fn merge_pull_request(
        &self,
        pr: &PrRef,
        message: &CommitMessage,
        head_sha: &str,
    ) -> Result<MergeSubmission> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            pr_number: pr.number,
            title: message.title.clone(),
            body: message.body.clone(),
            head_sha: head_sha.to_string(),
        });

        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| MergeSubmission::Merged {
                sha: Some(format!("merged_sha_{}", pr.number)),
            }))
    }

    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()> {
        self.comment_calls.lock().unwrap().push(CommentCall {
            pr_number: pr.number,
            body: body.to_string(),
        });

        if let Some(msg) = self.error_on_comment.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(())
    }

    async fn get_combined_status(&self, pr: &PullRequestSnapshot) -> Result<CombinedState> {
        self.status_calls.lock().unwrap().push(pr.number);

        if let Some(msg) = self.error_on_status.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .status_responses
            .lock()
            .unwrap()
            .get(&pr.number)
            .copied()
            .unwrap_or(CombinedState::Pending))
    }

    fn api_base(&self) -> &str {
        DEFAULT_API_BASE
    }
}

/// Call record for `dispatch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub repository: String,
    pub job: String,
    pub sha: String,
}

/// Job dispatcher that records calls and can be told to fail
#[derive(Default)]
pub struct MockJobDispatcher {
    calls: Mutex<Vec<DispatchCall>>,
    error: Mutex<Option<String>>,
}

impl MockJobDispatcher {
    /// Create a dispatcher that accepts every job
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dispatch` return an error
    pub fn fail(&self, msg: &str) {
        *self.error.lock().unwrap() = Some(msg.to_string());
    }

    /// All `dispatch` calls
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobDispatcher for MockJobDispatcher {
    async fn dispatch(&self, repository: &str, job: &str, sha: &str) -> Result<()> {
        self.calls.lock().unwrap().push(DispatchCall {
            repository: repository.to_string(),
            job: job.to_string(),
            sha: sha.to_string(),
        });

        if let Some(msg) = self.error.lock().unwrap().as_ref() {
            return Err(Error::Dispatch(msg.clone()));
        }
        Ok(())
    }
}
