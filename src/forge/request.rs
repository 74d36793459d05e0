use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(setter(into), default)]
/// Represents a normalized commit returned from any forge
pub struct ForgeCommit {
    pub sha: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(setter(into), default)]
/// A closed pull request as returned by a "closed, most recently updated
/// first" listing. `merged_at` is `None` for PRs closed without merging.
pub struct ClosedPullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
/// Request for one page of closed pull requests.
pub struct ClosedPrPageRequest {
    /// 1-based page number
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, Copy)]
/// Request for one page of releases.
pub struct ReleasePageRequest {
    /// 1-based page number
    pub page: u32,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq)]
/// A repository file and the blob sha needed to update it.
pub struct FileContent {
    pub sha: String,
    pub content: String,
}

#[derive(Debug, Clone)]
/// Request to create a new repository file.
pub struct CreateContentRequest {
    pub path: String,
    pub message: String,
    pub content: String,
}

#[derive(Debug, Clone)]
/// Request to replace an existing repository file.
pub struct UpdateContentRequest {
    pub path: String,
    pub message: String,
    /// Blob sha of the file being replaced
    pub prior_sha: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A tag resolved to the commit it points at.
pub struct TagRef {
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// A hosted release and its body text.
pub struct ForgeRelease {
    pub id: u64,
    pub tag_name: String,
    pub body: String,
}

#[derive(Debug, Clone)]
/// Request to replace a release body.
pub struct UpdateReleaseRequest {
    pub id: u64,
    pub body: String,
}
