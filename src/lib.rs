//! Incremental per-environment deploy changelogs built from merged pull
//! requests.
pub mod changelog;
pub mod checkpoint;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod publisher;
pub mod resolver;
pub mod sink;

pub use cli::{Args, Command};
pub use error::{DeploynotesError, Result};
pub use publisher::{DeployTarget, PublishOutcome, Publisher};
