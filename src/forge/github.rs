//! Implements the Forge trait for Github
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use log::*;
use octocrab::{
    Octocrab,
    models::repos::Object,
    params::{self, repos::Reference},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    DeploynotesError, Result,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            ClosedPrPageRequest, ClosedPullRequest, CreateContentRequest,
            FileContent, ForgeCommit, ForgeRelease, ReleasePageRequest,
            TagRef, UpdateContentRequest, UpdateReleaseRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Serialize)]
struct PageParams {
    pub per_page: u8,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CommitDetails {
    pub committer: Option<CommitSignature>,
    pub author: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Deserialize)]
struct CommitSha {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    pub commits: Vec<CommitSha>,
}

#[derive(Debug, Deserialize)]
struct AnnotatedTagObject {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct AnnotatedTag {
    pub object: AnnotatedTagObject,
}

/// GitHub forge implementation using Octocrab for API interactions with
/// commits, pull requests, repository contents and releases.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub async fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = match config.port {
            Some(port) => {
                format!("{}://api.{}:{}", config.scheme, config.host, port)
            }
            None => format!("{}://api.{}", config.scheme, config.host),
        };

        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?;
        let instance = builder.build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    fn repo_endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_uri, self.config.owner, self.config.repo, suffix
        )
    }

    fn is_status(err: &octocrab::Error, codes: &[StatusCode]) -> bool {
        matches!(
            err,
            octocrab::Error::GitHub { source, .. }
                if codes.contains(&source.status_code)
        )
    }

    /// Fetches every page of a list endpoint returning commit shas.
    async fn get_all_shas(&self, endpoint: &str) -> Result<Vec<String>> {
        let mut shas = vec![];
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let commits: Vec<CommitSha> =
                self.instance.get(endpoint, Some(&params)).await?;

            let count = commits.len();
            shas.extend(commits.into_iter().map(|c| c.sha));

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        Ok(shas)
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn get_commit(&self, sha: &str) -> Result<ForgeCommit> {
        let endpoint = self.repo_endpoint(&format!("commits/{sha}"));

        let result: std::result::Result<CommitResponse, octocrab::Error> =
            self.instance.get(endpoint, None::<&()>).await;

        match result {
            // github answers 422 rather than 404 for shas it cannot parse
            Err(err)
                if Self::is_status(
                    &err,
                    &[StatusCode::NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY],
                ) =>
            {
                Err(DeploynotesError::not_found(format!("commit {sha}")))
            }
            Err(err) => Err(err.into()),
            Ok(commit) => {
                let signature = commit
                    .commit
                    .committer
                    .or(commit.commit.author)
                    .ok_or_else(|| {
                        DeploynotesError::forge(format!(
                            "commit {sha} has no committer date"
                        ))
                    })?;

                Ok(ForgeCommit {
                    sha: commit.sha,
                    timestamp: signature.date,
                })
            }
        }
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Vec<String>> {
        let endpoint = self.repo_endpoint(&format!("compare/{base}...{head}"));
        let mut shas = vec![];
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let comparison: CompareResponse =
                self.instance.get(&endpoint, Some(&params)).await?;

            let count = comparison.commits.len();
            shas.extend(comparison.commits.into_iter().map(|c| c.sha));

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        debug!("found {} commits between {base} and {head}", shas.len());

        Ok(shas)
    }

    async fn closed_pull_requests(
        &self,
        req: ClosedPrPageRequest,
    ) -> Result<Vec<ClosedPullRequest>> {
        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::Closed)
            .sort(params::pulls::Sort::Updated)
            .direction(params::Direction::Descending)
            .per_page(req.per_page)
            .page(req.page)
            .send()
            .await?;

        let prs = page
            .items
            .into_iter()
            .map(|pr| ClosedPullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                body: pr.body.unwrap_or_default(),
                merged_at: pr.merged_at,
                updated_at: pr.updated_at.or(pr.created_at).unwrap_or_default(),
            })
            .collect::<Vec<ClosedPullRequest>>();

        Ok(prs)
    }

    async fn pull_request_commits(&self, number: u64) -> Result<Vec<String>> {
        let endpoint = self.repo_endpoint(&format!("pulls/{number}/commits"));
        self.get_all_shas(&endpoint).await
    }

    async fn find_content(&self, path: &str) -> Result<Option<FileContent>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_content()
            .path(path)
            .send()
            .await;

        match result {
            Err(err) if Self::is_status(&err, &[StatusCode::NOT_FOUND]) => {
                info!("no file found for path: {path}");
                Ok(None)
            }
            Err(err) => {
                error!("encountered error getting file contents for path: {path}: {err}");
                Err(err.into())
            }
            Ok(mut data) => {
                let items = data.take_items();

                let Some(item) = items.into_iter().next() else {
                    info!("no file found for path: {path}");
                    return Ok(None);
                };

                let encoded = item.content.unwrap_or_default();
                let stripped = encoded
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>();
                let bytes = STANDARD.decode(stripped)?;
                let content = String::from_utf8(bytes)?;

                Ok(Some(FileContent {
                    sha: item.sha,
                    content,
                }))
            }
        }
    }

    async fn create_content(&self, req: CreateContentRequest) -> Result<()> {
        info!("creating file: {}", req.path);

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_file(req.path, req.message, req.content)
            .send()
            .await?;

        Ok(())
    }

    async fn update_content(&self, req: UpdateContentRequest) -> Result<()> {
        info!("updating file: {} (prior sha {})", req.path, req.prior_sha);

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .update_file(req.path, req.message, req.content, req.prior_sha)
            .send()
            .await?;

        Ok(())
    }

    async fn find_tag(&self, name: &str) -> Result<TagRef> {
        let tag_ref = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get_ref(&Reference::Tag(name.to_string()))
            .await?;

        let sha = match tag_ref.object {
            Object::Commit { sha, .. } => sha,
            Object::Tag { sha, .. } => {
                // annotated tag: peel to the tagged object
                let endpoint = self.repo_endpoint(&format!("git/tags/{sha}"));
                let tag: AnnotatedTag =
                    self.instance.get(endpoint, None::<&()>).await?;
                tag.object.sha
            }
            _ => {
                return Err(DeploynotesError::forge(format!(
                    "tag {name} does not point at a commit"
                )));
            }
        };

        Ok(TagRef {
            name: name.to_string(),
            sha,
        })
    }

    async fn releases(
        &self,
        req: ReleasePageRequest,
    ) -> Result<Vec<ForgeRelease>> {
        let page = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .list()
            .per_page(req.per_page)
            .page(req.page)
            .send()
            .await?;

        let releases = page
            .items
            .into_iter()
            .map(|r| ForgeRelease {
                id: r.id.into_inner(),
                tag_name: r.tag_name,
                body: r.body.unwrap_or_default(),
            })
            .collect::<Vec<ForgeRelease>>();

        Ok(releases)
    }

    async fn find_release(&self, tag: &str) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(tag)
            .await;

        match result {
            Err(err) if Self::is_status(&err, &[StatusCode::NOT_FOUND]) => {
                info!("no release found for tag: {tag}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
            Ok(release) => Ok(Some(ForgeRelease {
                id: release.id.into_inner(),
                tag_name: release.tag_name,
                body: release.body.unwrap_or_default(),
            })),
        }
    }

    async fn create_release(&self, tag: &str) -> Result<ForgeRelease> {
        let release = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(tag)
            .name(tag)
            .draft(false)
            .prerelease(false)
            .send()
            .await?;

        info!("created release for tag: {tag}");

        Ok(ForgeRelease {
            id: release.id.into_inner(),
            tag_name: release.tag_name,
            body: release.body.unwrap_or_default(),
        })
    }

    async fn update_release(&self, req: UpdateReleaseRequest) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .update(req.id)
            .body(&req.body)
            .send()
            .await?;

        Ok(())
    }
}
