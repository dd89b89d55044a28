//! Marker-delimited blocks inside the user's shell profile.
//!
//! The profile belongs to the user. Only text between a begin/end marker
//! pair (plus the blank separator line written ahead of it) is ours to touch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ShelfError};
use crate::util::fsutil;

pub const BEGIN_MARKER: &str = "# >>> shelf managed block >>>";
pub const END_MARKER: &str = "# <<< shelf managed block <<<";

const BACKUPS_KEPT: usize = 10;
const BACKUP_STAMP: &str = "%Y%m%dT%H%M%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone)]
pub struct ProfileInjector {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl ProfileInjector {
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a block running `command` unless some line already contains it.
    ///
    /// Matching is literal: a copy of the command that differs only in
    /// whitespace counts as absent.
    pub fn add_block(&self, command: &str, description: &str) -> Result<AddOutcome> {
        let contents = self.read()?;
        if contents.lines().any(|line| line.contains(command)) {
            debug!(profile = %self.path.display(), command, "block already present");
            return Ok(AddOutcome::AlreadyPresent);
        }

        self.write(&append_block(&contents, command, description))?;
        debug!(profile = %self.path.display(), command, "appended block");
        Ok(AddOutcome::Added)
    }

    /// Drop every managed block. Returns how many were removed.
    pub fn reset_all(&self) -> Result<usize> {
        let contents = self.read()?;
        self.backup();

        let (stripped, removed) = strip_blocks(&contents);
        if removed > 0 {
            self.write(&stripped)?;
        }
        debug!(profile = %self.path.display(), removed, "reset managed blocks");
        Ok(removed)
    }

    /// Number of complete managed blocks currently in the profile.
    pub fn block_count(&self) -> Result<usize> {
        Ok(strip_blocks(&self.read()?).1)
    }

    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(ShelfError::Unreadable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        let target = fsutil::resolve_link(&self.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ShelfError::write(parent, source))?;
        }
        fsutil::write_atomic(&target, contents).map_err(|source| ShelfError::write(&target, source))
    }

    /// Best-effort timestamped copy of the profile; failures only warn.
    fn backup(&self) {
        if !self.path.exists() {
            return;
        }

        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());
        let stamp = chrono::Local::now().format(BACKUP_STAMP);
        let backup = self.backup_dir.join(format!("{name}.{stamp}"));

        let result = fs::create_dir_all(&self.backup_dir).and_then(|_| fs::copy(&self.path, &backup));
        match result {
            Ok(_) => {
                debug!(backup = %backup.display(), "backed up profile");
                self.prune_backups(&name);
            }
            Err(err) => warn!(
                profile = %self.path.display(),
                "could not back up profile: {err}"
            ),
        }
    }

    fn prune_backups(&self, name: &str) {
        let prefix = format!("{name}.");
        let mut backups: Vec<PathBuf> = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_string_lossy()
                        .strip_prefix(&prefix)
                        .is_some_and(is_backup_stamp)
                })
                .map(|entry| entry.path())
                .collect(),
            Err(_) => return,
        };

        if backups.len() <= BACKUPS_KEPT {
            return;
        }
        backups.sort();
        for stale in &backups[..backups.len() - BACKUPS_KEPT] {
            if let Err(err) = fs::remove_file(stale) {
                warn!(backup = %stale.display(), "could not prune backup: {err}");
            }
        }
    }
}

/// Matches `BACKUP_STAMP` output, e.g. `20240131T235959.123`.
fn is_backup_stamp(suffix: &str) -> bool {
    let bytes = suffix.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            8 => *byte == b'T',
            15 => *byte == b'.',
            _ => byte.is_ascii_digit(),
        })
}

fn append_block(contents: &str, command: &str, description: &str) -> String {
    let mut out = String::with_capacity(contents.len() + command.len() + 96);
    out.push_str(contents);
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }

    let header = format!("# {}", description.replace(['\n', '\r'], " "));
    for line in [BEGIN_MARKER, header.as_str(), command, END_MARKER] {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Remove marker pairs along with the blank separator preceding each begin
/// marker. An unterminated block is passed through untouched.
fn strip_blocks(contents: &str) -> (String, usize) {
    let mut kept: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut removed = 0;

    for line in contents.split_inclusive('\n') {
        let text = line.trim();

        if !pending.is_empty() {
            pending.push(line);
            if text == END_MARKER {
                pending.clear();
                removed += 1;
            }
            continue;
        }

        if text == BEGIN_MARKER {
            if kept.last().is_some_and(|prev| prev.trim().is_empty()) {
                pending.extend(kept.pop());
            }
            pending.push(line);
            continue;
        }

        kept.push(line);
    }

    kept.extend(pending);
    (kept.concat(), removed)
}
