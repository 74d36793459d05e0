//! Configuration loading and parsing for `deploynotes.toml` files.
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tokio::fs;

use crate::{
    Result,
    forge::config::{DEFAULT_PAGE_DELAY_MS, DEFAULT_PAGE_SIZE},
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "deploynotes.toml";
/// Default changelog path for the file and content sinks.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";
/// Default commit message for the content sink. `{environment}` is
/// replaced with the environment being published.
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "chore: update deploy changelog for {environment}";

/// Where and how the changelog is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct ChangelogConfig {
    /// File path (local or repository relative) of the changelog.
    pub path: String,
    /// Commit message used when writing the changelog through the forge.
    pub commit_message: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CHANGELOG_PATH.into(),
            commit_message: DEFAULT_COMMIT_MESSAGE.into(),
        }
    }
}

impl ChangelogConfig {
    pub fn commit_message_for(&self, environment: &str) -> String {
        self.commit_message.replace("{environment}", environment)
    }
}

/// Root configuration structure for `deploynotes.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of closed pull requests requested per page.
    pub page_size: u8,
    /// Delay between closed pull request page requests, in milliseconds.
    pub page_delay_ms: u64,
    /// Changelog persistence settings.
    pub changelog: ChangelogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            changelog: ChangelogConfig::default(),
        }
    }
}

impl Config {
    /// Reads configuration from a local file instead of the repository.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}
