//! Configuration for forge platform connections.
use secrecy::SecretString;

/// Default page size for paginated pull request and commit queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Default delay between paginated pull request requests.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1000;

/// Remote repository connection configuration for authenticating and
/// interacting with forge platforms.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// Remote forge port for self-hosted instances.
    pub port: Option<u16>,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Full repository path.
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            port: None,
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
/// Supported forge platforms.
pub enum Remote {
    Github(RemoteConfig),
}

impl Remote {
    pub fn config(&self) -> &RemoteConfig {
        match self {
            Remote::Github(config) => config,
        }
    }
}
