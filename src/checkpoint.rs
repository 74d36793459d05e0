//! Per-environment checkpoints embedded in published changelog text.
//!
//! A checkpoint is a single-key JSON object keyed by environment name:
//!
//! ```text
//! {"production":{"old_sha":"1a2b...","commit_sha":"3c4d..."}}
//! ```
//!
//! Changelog sections are always prepended, so the first checkpoint found for
//! an environment when reading from the top of a document is the newest one.
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CheckpointFields {
    old_sha: Option<String>,
    commit_sha: String,
}

/// The last publication recorded for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    pub environment: String,
    /// Commit the previous publication resumed from, `None` on a first deploy
    pub old_sha: Option<String>,
    /// Commit that was published
    pub commit_sha: String,
}

/// Serializes a checkpoint for `environment` as a single line of JSON.
pub fn encode(
    environment: &str,
    old_sha: Option<&str>,
    commit_sha: &str,
) -> Result<String> {
    let mut map = BTreeMap::new();

    map.insert(
        environment,
        CheckpointFields {
            old_sha: old_sha.map(String::from),
            commit_sha: commit_sha.to_string(),
        },
    );

    Ok(serde_json::to_string(&map)?)
}

/// Finds the first checkpoint recorded for `environment` in `text`.
///
/// Returns `None` when the environment was never published, or when the
/// embedded JSON cannot be parsed.
pub fn decode(text: &str, environment: &str) -> Option<Checkpoint> {
    // serializing the name gives the quoted, escaped json key
    let key = serde_json::to_string(environment).ok()?;
    let needle = format!("{{{key}");

    let start = text.find(&needle)?;

    let mut stream = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<BTreeMap<String, CheckpointFields>>();

    match stream.next() {
        Some(Ok(mut map)) => {
            let fields = map.remove(environment)?;
            debug!("found checkpoint for {environment}: {:?}", fields);
            Some(Checkpoint {
                environment: environment.to_string(),
                old_sha: fields.old_sha,
                commit_sha: fields.commit_sha,
            })
        }
        Some(Err(err)) => {
            warn!(
                "ignoring malformed checkpoint for {environment}: {err}: treating as first deploy"
            );
            None
        }
        None => None,
    }
}
