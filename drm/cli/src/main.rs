use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logging;
mod presenter;
mod remote;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::parse().run().await
}
