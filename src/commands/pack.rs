use crate::workspace::WorkspacePath;
use crate::{archive, ui, Workspace};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub fn pack(
    workspace: &Workspace,
    archive_path: PathBuf,
    paths: Vec<PathBuf>,
    base: Option<PathBuf>,
) -> Result<()> {
    let (base, members) = if paths.is_empty() {
        let root = workspace.path(WorkspacePath::Root);
        let parent = root
            .parent()
            .map(PathBuf::from)
            .context("Shelf directory has no parent")?;
        (base.unwrap_or(parent), vec![root])
    } else {
        let base = match base {
            Some(base) => base,
            None => env::current_dir().context("Failed to read current directory")?,
        };
        (base, paths)
    };

    let count = archive::pack(&archive_path, &base, &members)?;
    ui::success(
        "Packed",
        format!("{count} path(s) into {}", archive_path.display()),
    );
    Ok(())
}

pub fn unpack(archive_path: PathBuf, dest: PathBuf) -> Result<()> {
    archive::unpack(&archive_path, &dest)?;
    ui::success(
        "Unpacked",
        format!("{} into {}", archive_path.display(), dest.display()),
    );
    Ok(())
}
