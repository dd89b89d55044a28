//! The managed bin directory: one symlink per enabled tool.

use std::fs;
use std::io;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ShelfError};

#[derive(Debug, Clone)]
pub struct SymlinkManager {
    dir: PathBuf,
}

impl SymlinkManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Point `<dir>/<alias>` at `target` and mark `target` executable.
    ///
    /// An existing symlink under that name is always replaced. A regular file
    /// with the same name is never clobbered and fails the link.
    pub fn link(&self, target: &Path, alias: &str) -> Result<PathBuf> {
        let link = self.dir.join(alias);
        let failure = |source: io::Error| ShelfError::SymlinkFailure {
            link: link.clone(),
            target: target.to_path_buf(),
            source,
        };

        if !is_plain_name(alias) {
            return Err(failure(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("alias '{alias}' must be a plain file name"),
            )));
        }

        fs::create_dir_all(&self.dir).map_err(failure)?;

        if let Ok(metadata) = fs::symlink_metadata(&link) {
            if metadata.file_type().is_symlink() {
                fs::remove_file(&link).map_err(failure)?;
                debug!(link = %link.display(), "removed existing symlink");
            }
        }

        symlink(target, &link).map_err(failure)?;
        make_executable(target).map_err(|source| ShelfError::write(target, source))?;
        debug!(link = %link.display(), target = %target.display(), "linked tool");

        Ok(link)
    }

    /// Delete every symlink in the directory; other entries stay.
    pub fn reset_all(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(ShelfError::SymlinkFailure {
                    link: self.dir.clone(),
                    target: PathBuf::new(),
                    source,
                })
            }
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|source| ShelfError::SymlinkFailure {
                link: self.dir.clone(),
                target: PathBuf::new(),
                source,
            })?;
            let path = entry.path();
            let is_link = entry
                .file_type()
                .map(|file_type| file_type.is_symlink())
                .unwrap_or(false);
            if !is_link {
                continue;
            }

            let target = fs::read_link(&path).unwrap_or_default();
            fs::remove_file(&path).map_err(|source| ShelfError::SymlinkFailure {
                link: path.clone(),
                target,
                source,
            })?;
            removed += 1;
        }

        debug!(dir = %self.dir.display(), removed, "reset bin directory");
        Ok(removed)
    }

    /// Current `(name, target)` pairs, sorted by name.
    pub fn links(&self) -> io::Result<Vec<(String, PathBuf)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut links = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_symlink() {
                let name = entry.file_name().to_string_lossy().into_owned();
                links.push((name, fs::read_link(entry.path())?));
            }
        }
        links.sort();
        Ok(links)
    }
}

fn is_plain_name(alias: &str) -> bool {
    let mut components = Path::new(alias).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn make_executable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    let mode = permissions.mode();
    if mode & 0o111 != 0o111 {
        permissions.set_mode(mode | 0o111);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}
