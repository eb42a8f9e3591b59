//! Shared command context for CLI commands

use greenmerge::auth::get_github_auth;
use greenmerge::config::Config;
use greenmerge::error::Result;
use greenmerge::platform::{GitHubService, PlatformService};
use std::sync::Arc;
use tracing::debug;

/// Config plus an authenticated platform service
pub struct CommandContext {
    /// Effective configuration
    pub config: Config,
    /// GitHub service built from the config
    pub platform: Arc<dyn PlatformService>,
}

impl CommandContext {
    /// Resolve a token and connect to GitHub
    pub async fn new(config: Config) -> Result<Self> {
        let auth = get_github_auth().await?;
        debug!(source = ?auth.source, api_base = %config.api_base, "authenticated");

        let service = GitHubService::new(&auth.token, Some(&config.api_base), config.merge_method)?;
        Ok(Self {
            config,
            platform: Arc::new(service),
        })
    }
}
