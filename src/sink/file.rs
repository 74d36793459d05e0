//! Local changelog file.
use async_trait::async_trait;
use log::*;
use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::{
    Result,
    sink::{ChangelogSink, PersistedDocument},
};

/// Writes sections to a file on disk.
///
/// The new text is written to `<path>.new` first, the current file is kept
/// as `<path>.old`, and `<path>.new` is then renamed over `<path>`.
pub struct FileSink {
    path: PathBuf,
    dry_run: bool,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            path: path.into(),
            dry_run,
        }
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    async fn exists(path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }
}

#[async_trait(?Send)]
impl ChangelogSink for FileSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Option<PersistedDocument>> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(PersistedDocument {
                text,
                revision: None,
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("{} does not exist yet", self.location());
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn prepend(
        &self,
        section: &str,
        prior: Option<PersistedDocument>,
    ) -> Result<String> {
        let prior_text = prior.map(|doc| doc.text).unwrap_or_default();
        let text = format!("{section}{prior_text}");

        if self.dry_run {
            warn!(
                "dry_run: would write {}:\n{section}",
                self.location()
            );
            return Ok(text);
        }

        let new_path = self.with_suffix(".new");
        let old_path = self.with_suffix(".old");

        fs::write(&new_path, &text).await?;

        if Self::exists(&self.path).await? {
            fs::rename(&self.path, &old_path).await?;
        }

        fs::rename(&new_path, &self.path).await?;

        info!("wrote changelog to {}", self.location());

        Ok(text)
    }
}
