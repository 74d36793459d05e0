//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    config::{Config, DEFAULT_CONFIG_FILE},
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

#[derive(Debug, Clone, Copy, Default)]
pub struct ForgeOptions {
    /// Log writes instead of performing them
    pub dry_run: bool,
}

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
    options: ForgeOptions,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, options: ForgeOptions) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
            options,
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Loads `deploynotes.toml` from the repository, falling back to defaults
    pub async fn load_config(&self) -> Result<Config> {
        if let Some(file) = self.forge.find_content(DEFAULT_CONFIG_FILE).await?
        {
            let config: Config = toml::from_str(&file.content)?;
            Ok(config)
        } else {
            info!("repository configuration not found: using default");
            Ok(Config::default())
        }
    }

    pub async fn get_commit(&self, sha: &str) -> Result<ForgeCommit> {
        debug!("looking up commit: {sha}");
        self.forge.get_commit(sha).await
    }

    pub async fn compare(&self, base: &str, head: &str) -> Result<Vec<String>> {
        debug!("comparing commits: {base}...{head}");
        self.forge.compare(base, head).await
    }

    pub async fn closed_pull_requests(
        &self,
        req: ClosedPrPageRequest,
    ) -> Result<Vec<ClosedPullRequest>> {
        debug!(
            "fetching closed pull requests: page {}, per_page {}",
            req.page, req.per_page
        );
        self.forge.closed_pull_requests(req).await
    }

    pub async fn pull_request_commits(
        &self,
        number: u64,
    ) -> Result<Vec<String>> {
        debug!("fetching commits for pull request #{number}");
        self.forge.pull_request_commits(number).await
    }

    pub async fn find_content(&self, path: &str) -> Result<Option<FileContent>> {
        self.forge.find_content(path).await
    }

    pub async fn create_content(&self, req: CreateContentRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would create file: req: {:#?}", req);
            return Ok(());
        }
        self.forge.create_content(req).await
    }

    pub async fn update_content(&self, req: UpdateContentRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would update file: req: {:#?}", req);
            return Ok(());
        }
        self.forge.update_content(req).await
    }

    pub async fn find_tag(&self, name: &str) -> Result<TagRef> {
        debug!("resolving tag: {name}");
        self.forge.find_tag(name).await
    }

    /// Every release in the repository, newest first. Pages are fetched
    /// until one comes back short or empty.
    pub async fn list_releases(&self) -> Result<Vec<ForgeRelease>> {
        let mut releases = vec![];
        let mut page = 1;

        loop {
            debug!("fetching releases: page {page}");

            let fetched = self
                .forge
                .releases(ReleasePageRequest {
                    page,
                    per_page: DEFAULT_PAGE_SIZE,
                })
                .await?;

            let count = fetched.len();
            releases.extend(fetched);

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        debug!("found {} releases", releases.len());

        Ok(releases)
    }

    pub async fn find_release(&self, tag: &str) -> Result<Option<ForgeRelease>> {
        self.forge.find_release(tag).await
    }

    pub async fn create_release(&self, tag: &str) -> Result<ForgeRelease> {
        if self.options.dry_run {
            warn!("dry_run: would create release: tag: {tag}");
            return Ok(ForgeRelease {
                id: 0,
                tag_name: tag.to_string(),
                body: "".into(),
            });
        }
        self.forge.create_release(tag).await
    }

    pub async fn update_release(&self, req: UpdateReleaseRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would update release: req: {:#?}", req);
            return Ok(());
        }
        self.forge.update_release(req).await
    }
}
