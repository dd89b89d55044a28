use crate::shell::Shell;
use crate::workspace::WorkspacePath;
use crate::Workspace;
use anyhow::Result;

pub fn execute(workspace: &Workspace, shell: Option<String>) -> Result<()> {
    let shell = match shell {
        Some(name) => Shell::from_name(&name).unwrap_or_else(|| {
            let fallback = workspace.shell();
            eprintln!(
                "Unknown shell '{}'; defaulting to {}.",
                name,
                fallback.as_str()
            );
            fallback
        }),
        None => workspace.shell(),
    };

    println!("{}", shell.path_export(&workspace.path(WorkspacePath::Bin)));
    Ok(())
}
