use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use drm_core::FileKind;
use drm_device_format::{Resolver, VersionPolicy};
use drm_keybox::{Keybox, extract_serials};

use super::list_files;
use crate::presenter;

/**
    Inspect a credential file, or every file of a directory.
*/
#[derive(Args)]
pub struct InspectCommand {
    /**
        File or directory. Directories are not searched recursively.
    */
    pub path: PathBuf,

    /**
        Treat files as this kind instead of detecting it from the extension:
        playready, widevine, keybox or keybox-bundle.
    */
    #[arg(short, long)]
    pub kind: Option<FileKind>,

    /**
        Require the version byte of device files to match the layout version.
    */
    #[arg(long)]
    pub strict: bool,
}

impl InspectCommand {
    pub fn run(self) -> Result<()> {
        let metadata = std::fs::metadata(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        if !metadata.is_dir() {
            return self.inspect_file(&self.path);
        }

        let files = list_files(&self.path)?;
        if files.is_empty() {
            tracing::warn!("no files found in {}", self.path.display());
        }
        for file in files {
            if let Err(e) = self.inspect_file(&file) {
                tracing::error!("{e:#}");
            }
        }
        Ok(())
    }

    fn resolver(&self) -> Resolver {
        Resolver::with_policy(if self.strict {
            VersionPolicy::Strict
        } else {
            VersionPolicy::Structural
        })
    }

    fn inspect_file(&self, path: &Path) -> Result<()> {
        let kind = self.kind.unwrap_or_else(|| FileKind::from_path(path));
        tracing::info!("processing {} as {kind}", path.display());

        if let Some(family) = kind.family() {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let device = self
                .resolver()
                .resolve(&data, family)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            let title = format!("Parsed {family} Data (version {})", device.version);
            println!("{}", presenter::render(&title, &device.fields));
            return Ok(());
        }

        match kind {
            FileKind::Keybox => {
                let keybox = Keybox::from_file(path)
                    .with_context(|| format!("failed to parse keybox {}", path.display()))?;
                println!("{}", presenter::render("Parsed Keybox Data", &keybox.to_record()));
            }
            FileKind::KeyboxBundle => {
                let xml = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let record = match extract_serials(&xml) {
                    Ok(serials) => serials.to_record(),
                    Err(status) => status.to_record(),
                };
                println!("{}", presenter::render("Keybox Bundle", &record));
            }
            _ => {
                tracing::info!("skipping {}: unsupported file type", path.display());
            }
        }

        Ok(())
    }
}
