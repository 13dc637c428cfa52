use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use drm_keybox::Keybox;

use crate::presenter;

/**
    Decode a 128-byte Widevine keybox, whatever its file extension.
*/
#[derive(Args)]
pub struct KeyboxCommand {
    /// Path to the keybox file.
    pub path: PathBuf,
}

impl KeyboxCommand {
    pub fn run(self) -> Result<()> {
        let keybox = Keybox::from_file(&self.path)
            .with_context(|| format!("failed to parse keybox {}", self.path.display()))?;

        if !keybox.crc_valid() {
            tracing::warn!("keybox checksum does not match its contents");
        }

        println!("{}", presenter::render("Parsed Keybox Data", &keybox.to_record()));
        Ok(())
    }
}
