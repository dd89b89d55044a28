use crate::registry::Status;
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace, index: i64, apply: bool) -> Result<()> {
    let registry = super::load_registry(workspace)?;
    let toggled = workspace.toggle_service().toggle(index, &registry)?;

    let state = match toggled.status {
        Status::Enabled => "enabled",
        Status::Disabled => "disabled",
    };
    ui::success("Toggled", format!("[{}] {} is now {}", toggled.index, toggled.label, state));

    if apply {
        // The snapshot above is stale once the file is rewritten.
        let registry = workspace.registry()?;
        super::apply::apply_registry(workspace, &registry)?;
    }
    Ok(())
}
