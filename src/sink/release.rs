//! Release body for a deploy tag.
use async_trait::async_trait;
use log::*;
use std::rc::Rc;

use crate::{
    DeploynotesError, Result,
    forge::{manager::ForgeManager, request::UpdateReleaseRequest},
    sink::{ChangelogSink, PersistedDocument},
};

/// Publishes sections into the body of the release for `tag`. Without a tag
/// the sink can only be read from.
///
/// Loading reads every release body, newest release first, so the first
/// checkpoint found for an environment is its most recent one regardless of
/// which release it was written to.
pub struct ReleaseSink {
    forge: Rc<ForgeManager>,
    tag: Option<String>,
}

impl ReleaseSink {
    pub fn new(forge: Rc<ForgeManager>, tag: Option<&str>) -> Self {
        Self {
            forge,
            tag: tag.map(String::from),
        }
    }
}

#[async_trait(?Send)]
impl ChangelogSink for ReleaseSink {
    fn location(&self) -> String {
        match &self.tag {
            Some(tag) => format!("release {tag}"),
            None => "releases".into(),
        }
    }

    async fn load(&self) -> Result<Option<PersistedDocument>> {
        let releases = self.forge.list_releases().await?;

        if releases.is_empty() {
            return Ok(None);
        }

        let text = releases
            .into_iter()
            .map(|r| r.body)
            .collect::<Vec<String>>()
            .join("\n");

        Ok(Some(PersistedDocument {
            text,
            revision: None,
        }))
    }

    async fn prepend(
        &self,
        section: &str,
        _prior: Option<PersistedDocument>,
    ) -> Result<String> {
        let tag = self.tag.as_deref().ok_or_else(|| {
            DeploynotesError::invalid_args(
                "publishing to a release requires a deploy tag",
            )
        })?;

        let release = match self.forge.find_release(tag).await? {
            Some(release) => release,
            None => {
                info!("creating release for tag {tag}");
                self.forge.create_release(tag).await?
            }
        };

        let body = format!("{section}{}", release.body);

        self.forge
            .update_release(UpdateReleaseRequest {
                id: release.id,
                body: body.clone(),
            })
            .await?;

        info!("updated {}", self.location());

        Ok(body)
    }
}
