use crate::registry::Status;
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace) -> Result<()> {
    let registry = super::load_registry(workspace)?;
    if registry.is_empty() {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = registry
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = match entry.status {
                Status::Enabled => "[x]",
                Status::Disabled => "[ ]",
            };
            vec![
                index.to_string(),
                entry.kind.to_string(),
                marker.to_string(),
                entry.label().to_string(),
                entry.description.clone(),
            ]
        })
        .collect();

    ui::table(&["#", "Kind", "On", "Name", "Description"], &rows);
    Ok(())
}
