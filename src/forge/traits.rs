//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        request::{
            ClosedPrPageRequest, ClosedPullRequest, CreateContentRequest,
            FileContent, ForgeCommit, ForgeRelease, ReleasePageRequest,
            TagRef, UpdateContentRequest, UpdateReleaseRequest,
        },
    },
};

/// Operations deploynotes needs from a hosting service.
///
/// Lookups of single objects (`get_commit`, `find_tag`) return
/// [`crate::DeploynotesError::NotFound`] when the object does not exist;
/// lookups that callers routinely expect to miss return `Ok(None)`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;

    /// Commit metadata for a sha.
    async fn get_commit(&self, sha: &str) -> Result<ForgeCommit>;

    /// Shas of the commits reachable from `head` but not from `base`.
    async fn compare(&self, base: &str, head: &str) -> Result<Vec<String>>;

    /// One page of closed pull requests, most recently updated first.
    async fn closed_pull_requests(
        &self,
        req: ClosedPrPageRequest,
    ) -> Result<Vec<ClosedPullRequest>>;

    /// Shas of every commit on a pull request.
    async fn pull_request_commits(&self, number: u64) -> Result<Vec<String>>;

    async fn find_content(&self, path: &str) -> Result<Option<FileContent>>;
    async fn create_content(&self, req: CreateContentRequest) -> Result<()>;
    async fn update_content(&self, req: UpdateContentRequest) -> Result<()>;

    /// Resolves `refs/tags/<name>` to the commit it points at.
    async fn find_tag(&self, name: &str) -> Result<TagRef>;

    /// One page of releases, newest first.
    async fn releases(
        &self,
        req: ReleasePageRequest,
    ) -> Result<Vec<ForgeRelease>>;
    async fn find_release(&self, tag: &str) -> Result<Option<ForgeRelease>>;
    async fn create_release(&self, tag: &str) -> Result<ForgeRelease>;
    async fn update_release(&self, req: UpdateReleaseRequest) -> Result<()>;
}
