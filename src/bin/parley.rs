//! Parley CLI Binary
//!
//! Command-line interface for running agent conversations.

use anyhow::Context;
use clap::Parser;
use parley::logging::init_logging;
use parley::tooling::{Cli, CliContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut context =
        CliContext::new(cli.config.clone()).context("Error loading configuration")?;

    cli.apply_log_overrides(&mut context.config_mut().logging);
    init_logging(Some(&context.config().logging)).context("Error initializing logging")?;

    let output = context.execute(&cli.command).await?;
    println!("{}", output);
    Ok(())
}
