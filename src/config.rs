//! Configuration file loading
//!
//! Looked up at `--config PATH`, otherwise `<config dir>/greenmerge/config.toml`.
//! A missing file means defaults; a malformed one is an error.

use crate::error::{Error, Result};
use crate::merge::DEFAULT_TIMEOUT_MINUTES;
use crate::platform::DEFAULT_API_BASE;
use crate::types::MergeMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory name under the platform config dir
const CONFIG_DIR: &str = "greenmerge";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Bot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// GitHub API root
    pub api_base: String,
    /// Minutes an attempt may stay pending
    pub timeout_minutes: i64,
    /// Seconds between scheduler passes
    pub poll_interval_secs: u64,
    /// How PRs are merged
    pub merge_method: MergeMethod,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            merge_method: MergeMethod::default(),
        }
    }
}

impl Config {
    /// Attempt timeout
    ///
    /// Saturates for values [`validate`](Self::validate) would reject.
    pub fn timeout(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.timeout_minutes).unwrap_or(chrono::Duration::MAX)
    }

    /// Scheduler interval
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Check value ranges
    ///
    /// Runs on every parsed file; call it again after applying overrides.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_minutes <= 0 {
            return Err(Error::Config(format!(
                "timeout_minutes must be positive, got {}",
                self.timeout_minutes
            )));
        }
        if chrono::Duration::try_minutes(self.timeout_minutes).is_none() {
            return Err(Error::Config(format!(
                "timeout_minutes is too large: {}",
                self.timeout_minutes
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default config file location, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Parse config from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or the default location when `path` is `None`
///
/// An explicitly given path must exist. The default location may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        if required {
            return Err(Error::Config(format!("{} does not exist", path.display())));
        }
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    debug!(path = %path.display(), "loaded config");
    parse_config(&content)
}
