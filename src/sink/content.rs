//! Changelog file committed to the repository through the forge.
use async_trait::async_trait;
use log::*;
use std::rc::Rc;

use crate::{
    Result,
    forge::{
        manager::ForgeManager,
        request::{CreateContentRequest, UpdateContentRequest},
    },
    sink::{ChangelogSink, PersistedDocument},
};

pub struct ContentSink {
    forge: Rc<ForgeManager>,
    path: String,
    message: String,
}

impl ContentSink {
    pub fn new(forge: Rc<ForgeManager>, path: &str, message: &str) -> Self {
        Self {
            forge,
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl ChangelogSink for ContentSink {
    fn location(&self) -> String {
        let remote = self.forge.remote_config();
        format!("{}/{}:{}", remote.owner, remote.repo, self.path)
    }

    async fn load(&self) -> Result<Option<PersistedDocument>> {
        let file = self.forge.find_content(&self.path).await?;

        Ok(file.map(|f| PersistedDocument {
            text: f.content,
            revision: Some(f.sha),
        }))
    }

    async fn prepend(
        &self,
        section: &str,
        prior: Option<PersistedDocument>,
    ) -> Result<String> {
        match prior {
            Some(PersistedDocument {
                text: prior_text,
                revision: Some(prior_sha),
            }) => {
                let content = format!("{section}{prior_text}");
                info!("updating {}", self.location());
                self.forge
                    .update_content(UpdateContentRequest {
                        path: self.path.clone(),
                        message: self.message.clone(),
                        prior_sha,
                        content: content.clone(),
                    })
                    .await?;
                Ok(content)
            }
            prior => {
                let prior_text = prior.map(|doc| doc.text).unwrap_or_default();
                let content = format!("{section}{prior_text}");
                info!("creating {}", self.location());
                self.forge
                    .create_content(CreateContentRequest {
                        path: self.path.clone(),
                        message: self.message.clone(),
                        content: content.clone(),
                    })
                    .await?;
                Ok(content)
            }
        }
    }
}
