//! Bundle files into a gzip'd tarball and restore them elsewhere.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};

/// Write `members` into a `.tar.gz` at `archive_path`.
///
/// Relative members are resolved against `base` and stored under that
/// relative name; absolute members under `base` are stored relative to it,
/// anything else under its file name. Symlinks are stored as links. Returns
/// the number of members written.
pub fn pack(archive_path: &Path, base: &Path, members: &[PathBuf]) -> Result<usize> {
    if members.is_empty() {
        bail!("Nothing to pack");
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive {:?}", archive_path))?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    for member in members {
        let (source, name) = archive_name(base, member)?;
        let metadata = fs::symlink_metadata(&source)
            .with_context(|| format!("Failed to read {:?}", source))?;
        if metadata.is_dir() {
            builder
                .append_dir_all(&name, &source)
                .with_context(|| format!("Failed to add directory {:?}", source))?;
        } else {
            builder
                .append_path_with_name(&source, &name)
                .with_context(|| format!("Failed to add file {:?}", source))?;
        }
        tracing::debug!(source = %source.display(), name = %name.display(), "packed");
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("Failed to finish archive {:?}", archive_path))?;

    Ok(members.len())
}

fn archive_name(base: &Path, member: &Path) -> Result<(PathBuf, PathBuf)> {
    if member.is_relative() {
        return Ok((base.join(member), member.to_path_buf()));
    }

    if let Ok(relative) = member.strip_prefix(base) {
        if !relative.as_os_str().is_empty() {
            return Ok((member.to_path_buf(), relative.to_path_buf()));
        }
    }

    let name = member
        .file_name()
        .with_context(|| format!("Cannot derive an archive name for {:?}", member))?;
    Ok((member.to_path_buf(), PathBuf::from(name)))
}

/// Restore a `.tar.gz`/`.tgz` (or plain `.tar`) archive into `dest`.
pub fn unpack(archive_path: &Path, dest: &Path) -> Result<()> {
    let filename = archive_path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    fs::create_dir_all(dest).with_context(|| format!("Failed to create directory {:?}", dest))?;
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive {:?}", archive_path))?;

    if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
        Archive::new(GzDecoder::new(file))
            .unpack(dest)
            .with_context(|| format!("Failed to unpack tar.gz archive {:?}", archive_path))?;
    } else if filename.ends_with(".tar") {
        Archive::new(file)
            .unpack(dest)
            .with_context(|| format!("Failed to unpack tar archive {:?}", archive_path))?;
    } else {
        bail!("Unsupported archive format: {:?}", archive_path);
    }

    Ok(())
}
