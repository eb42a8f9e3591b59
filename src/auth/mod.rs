//! Authentication for GitHub
//!
//! Supports environment variables and the `gh` CLI.

use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// A GitHub token and where it came from
#[derive(Clone)]
pub struct GitHubAuth {
    /// The token
    pub token: String,
    /// Where it was found
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuth")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Token from the environment, if one is set and non-empty
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Find a GitHub token: environment first, then `gh auth token`
pub async fn get_github_auth() -> Result<GitHubAuth> {
    if let Some(token) = token_from_env() {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuth {
            token,
            source: AuthSource::EnvVar,
        });
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .map_err(|e| {
            Error::Auth(format!(
                "no {} set and `gh` could not be run: {e}",
                TOKEN_ENV_VARS.join("/")
            ))
        })?;

    if !output.status.success() {
        return Err(Error::Auth(format!(
            "`gh auth token` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth("`gh auth token` returned no token".to_string()));
    }

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuth {
        token,
        source: AuthSource::Cli,
    })
}
