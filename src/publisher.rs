//! Publishes a changelog section for one environment deploy.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use log::*;
use serde::Serialize;
use std::rc::Rc;

use crate::{
    DeploynotesError, Result,
    changelog::render,
    checkpoint::{self, Checkpoint},
    config::Config,
    forge::manager::ForgeManager,
    resolver::DiffResolver,
    sink::ChangelogSink,
};

/// Body of the first section published for an environment.
pub const FIRST_DEPLOY: &str = "First Deploy";

/// `asctime` style timestamp used in section headers.
const HEADER_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Source of the timestamp written into section headers.
pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

fn system_clock() -> Clock {
    Rc::new(Utc::now)
}

/// The ref being deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// Tag name, resolved to the commit it points at
    Tag(String),
    /// Commit sha, used as is
    Sha(String),
}

/// A section written by one publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArtifact {
    pub environment: String,
    /// Header, body and checkpoint of the new section
    pub rendered_text: String,
    pub target_location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PublishOutcome {
    Published(PublishedArtifact),
    /// The target commit was already recorded for the environment. Nothing
    /// was written and `text` is the stored document as loaded.
    AlreadyPublished {
        environment: String,
        commit_sha: String,
        text: String,
    },
}

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct PublisherParams {
    pub config: Rc<Config>,
    pub forge: Rc<ForgeManager>,
    pub sink: Rc<dyn ChangelogSink>,
    #[builder(default = "system_clock()")]
    pub clock: Clock,
}

impl PublisherParamsBuilder {
    pub fn build(&self) -> Result<Publisher> {
        let params = self._build().map_err(|e| {
            DeploynotesError::invalid_config(format!(
                "failed to build publisher: {}",
                e
            ))
        })?;
        Ok(Publisher::new(params))
    }
}

pub struct Publisher {
    forge: Rc<ForgeManager>,
    sink: Rc<dyn ChangelogSink>,
    clock: Clock,
    resolver: DiffResolver,
}

impl Publisher {
    pub fn builder() -> PublisherParamsBuilder {
        PublisherParamsBuilder::default()
    }

    pub fn new(params: PublisherParams) -> Self {
        Self {
            resolver: DiffResolver::new(Rc::clone(&params.forge), &params.config),
            forge: params.forge,
            sink: params.sink,
            clock: params.clock,
        }
    }

    /// Resolves a deploy target to the commit sha it refers to.
    pub async fn resolve_target(&self, target: &DeployTarget) -> Result<String> {
        match target {
            DeployTarget::Sha(sha) => Ok(sha.clone()),
            DeployTarget::Tag(name) => {
                let tag = self.forge.find_tag(name).await?;
                debug!("tag {} points at {}", tag.name, tag.sha);
                Ok(tag.sha)
            }
        }
    }

    /// Last checkpoint recorded for `environment` in the sink.
    pub async fn checkpoint(
        &self,
        environment: &str,
    ) -> Result<Option<Checkpoint>> {
        let prior = self.sink.load().await?;
        Ok(prior.and_then(|doc| checkpoint::decode(&doc.text, environment)))
    }

    /// Publishes the changes deployed to `environment` since its last
    /// checkpoint.
    pub async fn publish(
        &self,
        environment: &str,
        target: &DeployTarget,
    ) -> Result<PublishOutcome> {
        let new_sha = self.resolve_target(target).await?;

        let prior = self.sink.load().await?;

        let checkpoint = prior
            .as_ref()
            .and_then(|doc| checkpoint::decode(&doc.text, environment));

        if checkpoint.as_ref().is_some_and(|c| c.commit_sha == new_sha) {
            info!(
                "{} is already published for {environment} at {}",
                new_sha,
                self.sink.location()
            );
            return Ok(PublishOutcome::AlreadyPublished {
                environment: environment.to_string(),
                commit_sha: new_sha,
                text: prior.map(|doc| doc.text).unwrap_or_default(),
            });
        }

        let (old_sha, body) = match checkpoint {
            None => {
                info!("no checkpoint found for {environment}: first deploy");
                (None, FIRST_DEPLOY.to_string())
            }
            Some(checkpoint) => {
                self.diff_body(&checkpoint.commit_sha, &new_sha).await?
            }
        };

        // captured once so the header is stable for the whole section
        let timestamp = (self.clock)();

        let header = Self::header(environment, old_sha.as_deref(), timestamp);
        let metadata =
            checkpoint::encode(environment, old_sha.as_deref(), &new_sha)?;

        let section = format!("{header}\n\n{body}\n\n{metadata}\n\n");

        self.sink.prepend(&section, prior).await?;

        info!("published {environment} changelog to {}", self.sink.location());

        Ok(PublishOutcome::Published(PublishedArtifact {
            environment: environment.to_string(),
            rendered_text: section,
            target_location: self.sink.location(),
        }))
    }

    /// Renders the body for the changes between two commits. An old commit
    /// the forge no longer knows about is treated as a first deploy.
    async fn diff_body(
        &self,
        old_sha: &str,
        new_sha: &str,
    ) -> Result<(Option<String>, String)> {
        match self.resolver.merged_prs_since(old_sha, new_sha).await {
            Ok(prs) => {
                let entry = render(&prs);
                Ok((
                    Some(old_sha.to_string()),
                    format!("{}\n\n{}", entry.summary, entry.body),
                ))
            }
            Err(err @ DeploynotesError::PreviousCommitNotFound(_)) => {
                warn!("{err}: first deploy");
                Ok((None, FIRST_DEPLOY.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn header(
        environment: &str,
        old_sha: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> String {
        let deployed = format!(
            "## Deployed to: {environment} ({})",
            timestamp.format(HEADER_TIME_FORMAT)
        );

        match old_sha {
            Some(sha) => format!("{deployed}\n### Changes Since: {sha}"),
            None => deployed,
        }
    }
}
