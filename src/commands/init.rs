use crate::workspace::WorkspacePath;
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace) -> Result<()> {
    let registry = workspace.path(WorkspacePath::Registry);
    if workspace.init()? {
        ui::success("Created", registry.display());
    } else {
        ui::info(format!("Using existing registry at {}", registry.display()));
    }

    ui::status("Scripts", workspace.path(WorkspacePath::Root).display());
    ui::status("Profile", workspace.profile_path().display());
    ui::status("State", workspace.path(WorkspacePath::State).display());

    let config = workspace.path(WorkspacePath::ConfigFile);
    if config.exists() {
        ui::status("Config", config.display());
    } else {
        ui::status("Config", format!("{} (optional, not present)", config.display()));
    }

    let bin_dir = workspace.path(WorkspacePath::Bin);
    ui::info(format!(
        "Add this to your profile to run tools by name:\n{}",
        workspace.shell().path_export(&bin_dir)
    ));
    Ok(())
}
