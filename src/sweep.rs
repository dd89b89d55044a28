//! Remove browser download-provenance markers from a directory tree.
//!
//! Files copied out of a Windows browser download onto a Linux filesystem
//! (WSL, network shares) drag along `<name>:Zone.Identifier` siblings.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKER_SUFFIX: &str = ":Zone.Identifier";

/// Delete every marker file under `root` (or only list them on `dry_run`).
pub fn sweep(root: &Path, dry_run: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(MARKER_SUFFIX) {
            continue;
        }

        let path = entry.into_path();
        if !dry_run {
            fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            tracing::debug!(path = %path.display(), "removed marker");
        }
        found.push(path);
    }

    found.sort();
    Ok(found)
}
