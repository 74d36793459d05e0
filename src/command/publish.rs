//! Publishes the changelog section for a deploy.
use log::*;
use std::rc::Rc;

use crate::{
    DeploynotesError, Result,
    cli::{SinkArgs, SinkKind},
    command::build_sink,
    config::Config,
    forge::manager::ForgeManager,
    publisher::{DeployTarget, PublishOutcome, Publisher},
};

pub async fn execute(
    forge: Rc<ForgeManager>,
    config: Config,
    environment: &str,
    target: DeployTarget,
    sink_args: &SinkArgs,
) -> Result<()> {
    let outcome =
        publish(forge, config, environment, &target, sink_args).await?;

    let json = serde_json::json!(&outcome);
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}

pub async fn publish(
    forge: Rc<ForgeManager>,
    config: Config,
    environment: &str,
    target: &DeployTarget,
    sink_args: &SinkArgs,
) -> Result<PublishOutcome> {
    let tag = match target {
        DeployTarget::Tag(tag) => Some(tag.as_str()),
        DeployTarget::Sha(_) => None,
    };

    if sink_args.sink == SinkKind::Release && tag.is_none() {
        return Err(DeploynotesError::invalid_args(
            "--sink release requires --tag",
        ));
    }

    let sink =
        build_sink(Rc::clone(&forge), &config, sink_args, environment, tag);

    info!(
        "publishing {environment} deploy of {:?} to {}",
        target,
        sink.location()
    );

    let publisher = Publisher::builder()
        .config(Rc::new(config))
        .forge(forge)
        .sink(sink)
        .build()?;

    let outcome = publisher.publish(environment, target).await?;

    if let PublishOutcome::AlreadyPublished { commit_sha, .. } = &outcome {
        info!("nothing to publish: {commit_sha} already recorded for {environment}");
    }

    Ok(outcome)
}
