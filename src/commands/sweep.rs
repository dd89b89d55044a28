use crate::{sweep, ui};
use anyhow::Result;
use std::path::PathBuf;

pub fn execute(dir: PathBuf, dry_run: bool) -> Result<()> {
    let found = sweep::sweep(&dir, dry_run)?;
    let label = if dry_run { "Found" } else { "Removed" };

    for path in &found {
        ui::status(label, path.display());
    }

    if found.is_empty() {
        ui::info(format!("No download markers under {}", dir.display()));
    } else {
        ui::success(label, format!("{} marker file(s)", found.len()));
    }
    Ok(())
}
