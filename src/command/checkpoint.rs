//! Prints the last checkpoint recorded for an environment.
use std::rc::Rc;

use crate::{
    Result,
    checkpoint::Checkpoint,
    cli::SinkArgs,
    command::build_sink,
    config::Config,
    forge::manager::ForgeManager,
    publisher::Publisher,
};

pub async fn execute(
    forge: Rc<ForgeManager>,
    config: Config,
    environment: &str,
    sink_args: &SinkArgs,
) -> Result<()> {
    let checkpoint = read(forge, config, environment, sink_args).await?;

    let json = serde_json::json!(&checkpoint);
    println!("{json}");

    Ok(())
}

pub async fn read(
    forge: Rc<ForgeManager>,
    config: Config,
    environment: &str,
    sink_args: &SinkArgs,
) -> Result<Option<Checkpoint>> {
    let sink =
        build_sink(Rc::clone(&forge), &config, sink_args, environment, None);

    let publisher = Publisher::builder()
        .config(Rc::new(config))
        .forge(forge)
        .sink(sink)
        .build()?;

    publisher.checkpoint(environment).await
}
