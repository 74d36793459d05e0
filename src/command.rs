//! Command execution for deploynotes.
//!
//! - **publish**: prepend a new section for a deploy to the changelog
//! - **checkpoint**: print the last recorded checkpoint for an environment
use log::*;
use std::{path::Path, rc::Rc};

use crate::{
    Result,
    cli::{Args, Command, SinkArgs, SinkKind},
    config::Config,
    forge::{
        factory::ForgeFactory,
        manager::{ForgeManager, ForgeOptions},
    },
    sink::{ChangelogSink, ContentSink, FileSink, ReleaseSink},
};

pub mod checkpoint;
pub mod publish;

/// Runs the subcommand selected on the command line.
pub async fn execute(args: &Args) -> Result<()> {
    let remote = args.get_remote()?;

    let forge = Rc::new(
        ForgeFactory::create(
            &remote,
            ForgeOptions {
                dry_run: args.dry_run,
            },
        )
        .await?,
    );

    let config = load_config(&forge, args.config.as_deref()).await?;

    match &args.command {
        Command::Publish {
            environment,
            target,
            sink,
        } => {
            publish::execute(forge, config, environment, target.target()?, sink)
                .await
        }
        Command::Checkpoint { environment, sink } => {
            checkpoint::execute(forge, config, environment, sink).await
        }
    }
}

/// Reads a local configuration file when given, the repository's
/// `deploynotes.toml` otherwise.
pub async fn load_config(
    forge: &ForgeManager,
    local: Option<&str>,
) -> Result<Config> {
    match local {
        Some(path) => {
            info!("loading configuration from {path}");
            Config::from_file(Path::new(path)).await
        }
        None => forge.load_config().await,
    }
}

/// Builds the changelog sink selected on the command line. `tag` is the
/// release a release sink writes to, and `environment` fills in the
/// repository commit message.
pub fn build_sink(
    forge: Rc<ForgeManager>,
    config: &Config,
    args: &SinkArgs,
    environment: &str,
    tag: Option<&str>,
) -> Rc<dyn ChangelogSink> {
    let path = args.path.as_deref().unwrap_or(&config.changelog.path);

    match args.sink {
        SinkKind::File => Rc::new(FileSink::new(path, forge.dry_run())),
        SinkKind::Content => Rc::new(ContentSink::new(
            Rc::clone(&forge),
            path,
            &config.changelog.commit_message_for(environment),
        )),
        SinkKind::Release => Rc::new(ReleaseSink::new(forge, tag)),
    }
}
