//! Custom error types for deploynotes.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for deploynotes operations.
#[derive(Error, Debug)]
pub enum DeploynotesError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Forge errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Previous commit not found: {0}")]
    PreviousCommitNotFound(String),

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Invalid git remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    // API errors
    #[error("API authentication failed: {0}")]
    AuthenticationError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Parsing errors
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using DeploynotesError
pub type Result<T> = std::result::Result<T, DeploynotesError>;

impl DeploynotesError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create a not found error for a missing tag, ref, release or file
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid args error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Turns a 404 from a lookup that must succeed into a forge failure.
    /// Other errors pass through unchanged.
    pub fn into_upstream(self) -> Self {
        match self {
            Self::NotFound(msg) => Self::ForgeError(msg),
            err => err,
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for DeploynotesError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for DeploynotesError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                Self::NotFound(source.message.clone())
            }
            octocrab::Error::GitHub { source, .. }
                if source.status_code == StatusCode::UNAUTHORIZED =>
            {
                Self::AuthenticationError(source.message.clone())
            }
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = DeploynotesError::forge("API call failed");
        assert_eq!(err.to_string(), "Forge operation failed: API call failed");

        let err = DeploynotesError::invalid_config("missing field");
        assert_eq!(err.to_string(), "Invalid configuration: missing field");

        let err = DeploynotesError::not_found("tags/v1.0.0");
        assert_eq!(err.to_string(), "Not found: tags/v1.0.0");
    }

    #[test]
    fn test_error_helpers() {
        let err = DeploynotesError::forge("API call failed");
        assert!(matches!(err, DeploynotesError::ForgeError(_)));
        assert!(!err.is_not_found());

        let err = DeploynotesError::invalid_args("missing --tag");
        assert!(matches!(err, DeploynotesError::InvalidArgs(_)));

        let err = DeploynotesError::not_found("release v2");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_into_upstream() {
        let err = DeploynotesError::not_found("No commit found for SHA: typo")
            .into_upstream();
        assert!(matches!(err, DeploynotesError::ForgeError(ref msg) if msg == "No commit found for SHA: typo"));
        assert!(!err.is_not_found());

        let err = DeploynotesError::RateLimitExceeded.into_upstream();
        assert!(matches!(err, DeploynotesError::RateLimitExceeded));
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope");
        assert!(json_err.is_err());
        let err: DeploynotesError = json_err.unwrap_err().into();
        assert!(matches!(err, DeploynotesError::JsonParseError(_)));

        let io_err = std::io::Error::other("disk gone");
        let err: DeploynotesError = io_err.into();
        assert!(matches!(err, DeploynotesError::Other(_)));
    }
}
