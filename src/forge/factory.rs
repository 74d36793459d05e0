//! Factory for creating forge implementations based on configuration.

use crate::{
    Result,
    forge::{
        config::{Remote, RemoteConfig},
        github::Github,
        manager::{ForgeManager, ForgeOptions},
        traits::Forge,
    },
};

/// Factory for creating forge implementations.
pub struct ForgeFactory;

impl ForgeFactory {
    /// Create a ForgeManager instance based on the Remote configuration.
    pub async fn create(
        remote: &Remote,
        options: ForgeOptions,
    ) -> Result<ForgeManager> {
        let forge: Box<dyn Forge> = match remote {
            Remote::Github(config) => Self::create_github(config).await?,
        };

        Ok(ForgeManager::new(forge, options))
    }

    async fn create_github(config: &RemoteConfig) -> Result<Box<dyn Forge>> {
        Ok(Box::new(Github::new(config.clone()).await?))
    }
}
