//! Error types for greenmerge

use thiserror::Error;

/// Errors surfaced by the merge bot and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API returned something we could not use
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure (used by alternative platform implementations)
    #[error("platform error: {0}")]
    Platform(String),

    /// A pull request reference could not be parsed
    #[error("invalid pull request reference: {0}")]
    InvalidPrRef(String),

    /// The CI job dispatcher refused or failed to accept a job
    #[error("job dispatch failed: {0}")]
    Dispatch(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invariant violation inside the bot
    #[error("internal error: {0}")]
    Internal(String),

    /// Error from octocrab
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Error from reqwest
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed TOML
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
