//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CombinedState, CommitMessage, MergeFailure, MergeMethod, MergeSubmission, MergeableState,
    PrRef, PrState, PullRequestSnapshot,
};
use async_trait::async_trait;
use octocrab::models::IssueState;
use octocrab::models::pulls::{MergeableState as GhMergeableState, PullRequest};
use octocrab::{GitHubError, Octocrab};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Public GitHub API root
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Deserialize)]
struct CombinedStatusPayload {
    state: CombinedState,
    total_count: u32,
}

fn map_mergeable_state(state: Option<&GhMergeableState>) -> MergeableState {
    match state {
        Some(GhMergeableState::Behind) => MergeableState::Behind,
        Some(GhMergeableState::Blocked) => MergeableState::Blocked,
        Some(GhMergeableState::Clean) => MergeableState::Clean,
        Some(GhMergeableState::Dirty) => MergeableState::Dirty,
        Some(GhMergeableState::Draft) => MergeableState::Draft,
        Some(GhMergeableState::HasHooks) => MergeableState::HasHooks,
        Some(GhMergeableState::Unstable) => MergeableState::Unstable,
        // non-exhaustive upstream
        Some(_) | None => MergeableState::Unknown,
    }
}

const fn map_merge_method(method: MergeMethod) -> octocrab::params::pulls::MergeMethod {
    match method {
        MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
        MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
        MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
    }
}

fn merge_failure(error: &GitHubError) -> MergeFailure {
    MergeFailure {
        status: error.status_code.as_u16(),
        message: Some(error.message.clone()).filter(|m| !m.is_empty()),
        documentation_url: error.documentation_url.clone(),
        raw: error.to_string(),
    }
}

fn snapshot_from(pr: PullRequest, pr_ref: &PrRef, api_base: &str) -> PullRequestSnapshot {
    let repo_url = format!("{api_base}/repos/{}/{}", pr_ref.owner, pr_ref.repo);
    let (base_repo_full_name, base_repo_url) = match pr.base.repo.as_ref() {
        Some(repo) => (
            repo.full_name.clone().unwrap_or_else(|| pr_ref.full_name()),
            repo.url.to_string(),
        ),
        None => (pr_ref.full_name(), repo_url.clone()),
    };
    let statuses_url = pr.statuses_url.as_ref().map_or_else(
        || format!("{repo_url}/statuses/{}", pr.head.sha),
        ToString::to_string,
    );

    PullRequestSnapshot {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        body: pr.body.clone(),
        // IssueState is non-exhaustive, anything but Open counts as closed
        state: match pr.state {
            Some(IssueState::Open) => PrState::Open,
            Some(_) | None => PrState::Closed,
        },
        merged: pr.merged_at.is_some(),
        mergeable: pr.mergeable,
        mergeable_state: map_mergeable_state(pr.mergeable_state.as_ref()),
        head_sha: pr.head.sha.clone(),
        base_repo_full_name,
        base_repo_url,
        statuses_url,
    }
}

/// Turn a commit's `statuses_url` into its combined status resource
///
/// `.../repos/o/r/statuses/<sha>` becomes `.../repos/o/r/commits/<sha>/status`.
pub fn combined_status_url(statuses_url: &str) -> Option<String> {
    let (repo_url, sha) = statuses_url.rsplit_once("/statuses/")?;
    let sha = sha.trim_end_matches('/');
    if sha.is_empty() || sha.contains('/') {
        return None;
    }
    Some(format!("{repo_url}/commits/{sha}/status"))
}

/// `owner/repo` from a repository API URL such as `<api>/repos/owner/repo`
pub fn repository_name_from_url(repo_url: &str, api_base: &str) -> Option<String> {
    let prefix = format!("{}/repos/", api_base.trim_end_matches('/'));
    let name = repo_url.strip_prefix(&prefix)?.trim_end_matches('/');
    match name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Some(name.to_string())
        }
        _ => None,
    }
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    /// Token for raw HTTP requests (merge, combined status)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API root without trailing slash
    api_base: String,
    merge_method: MergeMethod,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_base` defaults to the public API; pass `https://host/api/v3` for
    /// GitHub Enterprise.
    pub fn new(token: &str, api_base: Option<&str>, merge_method: MergeMethod) -> Result<Self> {
        let api_base = api_base
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("greenmerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            api_base,
            merge_method,
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pull_request(&self, pr: &PrRef) -> Result<PullRequestSnapshot> {
        debug!(%pr, "fetching PR");
        let payload = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await?;

        let snapshot = snapshot_from(payload, pr, &self.api_base);
        debug!(
            %pr,
            mergeable = ?snapshot.mergeable,
            mergeable_state = %snapshot.mergeable_state,
            "fetched PR"
        );
        Ok(snapshot)
    }

    async fn merge_pull_request(
        &self,
        pr: &PrRef,
        message: &CommitMessage,
        head_sha: &str,
    ) -> Result<MergeSubmission> {
        debug!(%pr, head_sha, method = %self.merge_method, "merging PR");
        let result = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .merge(pr.number)
            .title(message.title.as_str())
            .message(message.body.as_str())
            .sha(head_sha)
            .method(map_merge_method(self.merge_method))
            .send()
            .await;

        match result {
            Ok(merge) if merge.merged => {
                debug!(%pr, sha = ?merge.sha, "merge complete");
                Ok(MergeSubmission::Merged { sha: merge.sha })
            }
            Ok(merge) => Ok(MergeSubmission::Rejected(MergeFailure {
                status: StatusCode::OK.as_u16(),
                raw: merge.message.clone().unwrap_or_default(),
                message: merge.message,
                documentation_url: None,
            })),
            Err(octocrab::Error::GitHub { source, .. }) => {
                debug!(%pr, status = %source.status_code, message = %source.message, "merge rejected");
                Ok(MergeSubmission::Rejected(merge_failure(&source)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()> {
        debug!(%pr, "creating PR comment");
        self.client
            .issues(&pr.owner, &pr.repo)
            .create_comment(pr.number, body)
            .await?;
        debug!(%pr, "created PR comment");
        Ok(())
    }

    async fn get_combined_status(&self, pr: &PullRequestSnapshot) -> Result<CombinedState> {
        let url = combined_status_url(&pr.statuses_url).ok_or_else(|| {
            Error::GitHubApi(format!("Unrecognized statuses URL: {}", pr.statuses_url))
        })?;

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch commit status: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::GitHubApi(format!("Commit status not found: {url}")));
        }
        let response = response.error_for_status()?;

        let status: CombinedStatusPayload = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse commit status: {e}")))?;

        debug!(state = %status.state, count = status.total_count, "Commit status result");
        Ok(status.state)
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }
}
