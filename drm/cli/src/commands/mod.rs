mod inspect;
mod keybox;
mod list;
mod revocation;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use self::inspect::InspectCommand;
pub use self::keybox::KeyboxCommand;
pub use self::list::ListCommand;
pub use self::revocation::RevocationCommand;

/**
    Regular files directly inside `dir`, sorted by path.
*/
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
