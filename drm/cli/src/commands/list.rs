use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use drm_core::FileKind;

use super::list_files;

/**
    List the files of a directory with their detected kind.
*/
#[derive(Args)]
pub struct ListCommand {
    /// Directory to list.
    pub dir: PathBuf,
}

impl ListCommand {
    pub fn run(self) -> Result<()> {
        let files = list_files(&self.dir)?;
        if files.is_empty() {
            tracing::warn!("no files found in {}", self.dir.display());
            return Ok(());
        }

        for (idx, path) in files.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("{:>3}. {:<14} {name}", idx + 1, FileKind::from_path(path).to_name());
        }

        Ok(())
    }
}
