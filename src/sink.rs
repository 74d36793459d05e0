//! Destinations a published changelog section is persisted to.
//!
//! Every sink prepends new sections to what is already stored, so the most
//! recent publication is always at the top of the document.
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::Result;

pub mod content;
pub mod file;
pub mod release;

pub use content::ContentSink;
pub use file::FileSink;
pub use release::ReleaseSink;

/// What a sink currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedDocument {
    pub text: String,
    /// Revision the hosting service requires to accept an update
    pub revision: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait(?Send)]
pub trait ChangelogSink {
    /// Human readable description of where sections are written.
    fn location(&self) -> String;

    /// Loads the stored document, `None` if nothing was published yet.
    async fn load(&self) -> Result<Option<PersistedDocument>>;

    /// Writes `section` above the `prior` document and returns the new text.
    async fn prepend(
        &self,
        section: &str,
        prior: Option<PersistedDocument>,
    ) -> Result<String>;
}
