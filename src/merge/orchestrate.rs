//! Run a CI job, then hand the PR to merge monitoring

use crate::dispatch::JobDispatcher;
use crate::error::Result;
use crate::platform::{PlatformService, repository_name_from_url};
use crate::registry::AttemptRegistry;
use crate::types::{MergeAttempt, PrRef};
use tracing::{debug, info};

/// Dispatch `job` for the PR's head commit and register a merge attempt
///
/// Never merges by itself. When dispatch fails the error is returned and
/// nothing is registered, so no merge will be attempted.
pub async fn run_then_merge(
    platform: &dyn PlatformService,
    registry: &AttemptRegistry,
    dispatcher: &dyn JobDispatcher,
    pr: &PrRef,
    job: &str,
) -> Result<MergeAttempt> {
    let snapshot = platform.get_pull_request(pr).await?;

    let repository = repository_name_from_url(&snapshot.base_repo_url, platform.api_base())
        .unwrap_or_else(|| snapshot.base_repo_full_name.clone());

    debug!(%pr, repository, job, sha = %snapshot.head_sha, "dispatching job");
    dispatcher
        .dispatch(&repository, job, &snapshot.head_sha)
        .await?;

    info!(%pr, job, "job accepted, monitoring for merge");
    Ok(registry.register(pr.clone()))
}
