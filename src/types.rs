//! Core types for greenmerge

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A reference to a single pull request
///
/// Accepted forms:
/// - API URL: `https://api.github.com/repos/owner/repo/pulls/42`
/// - Web URL: `https://github.com/owner/repo/pull/42`
/// - Shorthand: `owner/repo#42`
///
/// The shorthand is also the canonical display form and the registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub number: u64,
}

impl PrRef {
    /// Create a reference from its parts
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::InvalidPrRef(format!("{raw}: {e}")))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        // Enterprise API URLs carry an `/api/v3` prefix before `repos`
        let parts = match segments.iter().position(|s| *s == "repos") {
            Some(idx) => &segments[idx + 1..],
            None => &segments[..],
        };

        match parts {
            [owner, repo, "pulls" | "pull", number, ..] => {
                let number = number
                    .parse()
                    .map_err(|_| Error::InvalidPrRef(format!("{raw}: bad PR number")))?;
                Ok(Self::new(*owner, *repo, number))
            }
            _ => Err(Error::InvalidPrRef(format!(
                "{raw}: expected .../owner/repo/pull(s)/<number>"
            ))),
        }
    }

    fn from_shorthand(raw: &str) -> Result<Self> {
        let (full_name, number) = raw
            .split_once('#')
            .ok_or_else(|| Error::InvalidPrRef(raw.to_string()))?;
        let (owner, repo) = full_name
            .split_once('/')
            .ok_or_else(|| Error::InvalidPrRef(raw.to_string()))?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(Error::InvalidPrRef(raw.to_string()));
        }
        let number = number
            .parse()
            .map_err(|_| Error::InvalidPrRef(format!("{raw}: bad PR number")))?;
        Ok(Self::new(owner, repo, number))
    }
}

impl FromStr for PrRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains("://") {
            Self::from_url(s)
        } else {
            Self::from_shorthand(s)
        }
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// GitHub's finer-grained merge readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// Head is out of date with base
    Behind,
    /// Blocked by branch protection (reviews, required checks)
    Blocked,
    /// Ready to merge
    Clean,
    /// Merge conflicts
    Dirty,
    /// PR is a draft
    Draft,
    /// Mergeable with passing commit status, but pre-receive hooks exist
    HasHooks,
    /// Not yet computed
    Unknown,
    /// Mergeable, but non-required checks are failing
    Unstable,
}

impl fmt::Display for MergeableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Behind => "behind",
            Self::Blocked => "blocked",
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Draft => "draft",
            Self::HasHooks => "has_hooks",
            Self::Unknown => "unknown",
            Self::Unstable => "unstable",
        };
        f.write_str(s)
    }
}

/// PR state (open or closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed, with or without merging
    Closed,
}

/// The fields of a pull request the merge evaluator looks at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR description
    pub body: Option<String>,
    /// Open or closed
    pub state: PrState,
    /// Whether the PR has already been merged
    pub merged: bool,
    /// Tri-state mergeability
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = has conflicts
    /// - `None` = unknown (GitHub still computing)
    pub mergeable: Option<bool>,
    /// Detailed merge state
    pub mergeable_state: MergeableState,
    /// SHA of the head commit
    pub head_sha: String,
    /// `owner/repo` of the base repository
    pub base_repo_full_name: String,
    /// API URL of the base repository
    pub base_repo_url: String,
    /// API URL of the head commit's statuses collection
    pub statuses_url: String,
}

impl PullRequestSnapshot {
    /// Whether the PR is closed or already merged
    pub const fn is_finished(&self) -> bool {
        self.merged || matches!(self.state, PrState::Closed)
    }
}

/// Combined CI status for a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinedState {
    /// At least one status is still running (or none reported yet)
    Pending,
    /// Every status succeeded
    Success,
    /// At least one status failed
    Failure,
    /// At least one status errored
    Error,
}

impl fmt::Display for CombinedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Title and body used for the merge commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// Commit title (first line)
    pub title: String,
    /// Commit body, already wrapped
    pub body: String,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// A structured refusal from the merge endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    /// HTTP status code
    pub status: u16,
    /// `message` field of the error payload
    pub message: Option<String>,
    /// `documentation_url` field of the error payload
    pub documentation_url: Option<String>,
    /// Raw response body
    pub raw: String,
}

impl MergeFailure {
    /// Whether the head branch changed underneath us
    pub const fn is_conflict(&self) -> bool {
        self.status == 409
    }
}

/// Result of submitting a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeSubmission {
    /// The PR was merged
    Merged {
        /// SHA of the merge commit
        sha: Option<String>,
    },
    /// GitHub refused the merge
    Rejected(MergeFailure),
}

/// A pending intent to merge one pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeAttempt {
    /// The pull request to merge
    pub pr: PrRef,
    /// When monitoring started; used for timeout enforcement
    pub started_at: DateTime<Utc>,
}

impl MergeAttempt {
    /// Start monitoring now
    pub fn new(pr: PrRef) -> Self {
        Self::started_at(pr, Utc::now())
    }

    /// Start monitoring at an explicit instant
    pub fn started_at(pr: PrRef, started_at: DateTime<Utc>) -> Self {
        Self { pr, started_at }
    }
}
