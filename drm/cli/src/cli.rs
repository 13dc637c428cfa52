use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{InspectCommand, KeyboxCommand, ListCommand, RevocationCommand};
use crate::logging;

/**
    Inspect PlayReady and Widevine device files, Widevine keyboxes
    and keybox attestation bundles.
*/
#[derive(Parser)]
#[command(name = "drm-parser", version)]
pub struct Cli {
    /**
        Also append logs to this file. Log level is taken from `RUST_LOG`.
    */
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Inspect(InspectCommand),
    Keybox(KeyboxCommand),
    Revocation(RevocationCommand),
    List(ListCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        logging::init(self.log_file.as_deref())?;

        match self.command {
            Command::Inspect(cmd) => cmd.run(),
            Command::Keybox(cmd) => cmd.run(),
            Command::Revocation(cmd) => cmd.run().await,
            Command::List(cmd) => cmd.run(),
        }
    }
}
