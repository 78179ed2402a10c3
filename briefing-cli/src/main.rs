//! Binary crate for the `briefing` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and resolving them against env vars and the config file
//! - Logging setup
//! - Interactive token configuration

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init(cmd.verbose);
    cmd.run().await
}
