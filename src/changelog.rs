//! Changelog text assembly from pull request descriptions.

/// Renders included pull requests into summary and body text.
pub mod parser;

/// Heading-delimited section extraction.
pub mod section;

pub use parser::{ChangelogEntry, PullRequestRecord, render, render_single};
