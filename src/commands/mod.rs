use crate::cli::{Cli, Commands};
use crate::registry::Registry;
use crate::workspace::WorkspacePath;
use crate::{ui, Workspace};
use anyhow::Result;
use std::io;

mod apply;
mod env;
mod init;
mod interactive;
mod list;
mod pack;
mod run;
mod sweep;
mod toggle;

pub fn execute(cli: Cli) -> Result<()> {
    // Create workspace - this is the root entry point
    let workspace = Workspace::new()?;

    match cli.command {
        None => interactive::execute(&workspace, &mut io::stdin().lock()),

        Some(Commands::Init) => init::execute(&workspace),

        Some(Commands::List) => list::execute(&workspace),

        Some(Commands::Toggle { index, no_apply }) => toggle::execute(&workspace, index, !no_apply),

        Some(Commands::Apply) => apply::execute(&workspace),

        Some(Commands::Env { shell }) => env::execute(&workspace, shell),

        Some(Commands::Pack {
            archive,
            paths,
            base,
        }) => pack::pack(&workspace, archive, paths, base),

        Some(Commands::Unpack { archive, dest }) => pack::unpack(archive, dest),

        Some(Commands::Sweep { dir, dry_run }) => sweep::execute(dir, dry_run),

        Some(Commands::Run {
            quiet,
            log_dir,
            command,
        }) => run::execute(&workspace, quiet, log_dir, command),
    }
}

/// Parse the registry and surface its recoverable warnings
fn load_registry(workspace: &Workspace) -> Result<Registry> {
    let registry = workspace.registry()?;
    let path = workspace.path(WorkspacePath::Registry);

    for warning in registry.warnings() {
        ui::warn(format!("{}: skipped {}", path.display(), warning));
    }
    if registry.is_empty() {
        ui::warn(format!("No entries found in {}", path.display()));
    }

    Ok(registry)
}
