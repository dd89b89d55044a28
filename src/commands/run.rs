use crate::runlog::RunLog;
use crate::workspace::WorkspacePath;
use crate::{ui, Workspace};
use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

pub fn execute(
    workspace: &Workspace,
    quiet: bool,
    log_dir: Option<PathBuf>,
    command: Vec<OsString>,
) -> Result<()> {
    let (program, args) = command.split_first().context("No command given")?;
    let program = program
        .to_str()
        .context("Command name must be valid UTF-8")?;
    let log_dir = log_dir.unwrap_or_else(|| workspace.path(WorkspacePath::Logs));

    let outcome = RunLog::new(log_dir, !quiet).run(program, args)?;
    ui::info(format!("Output saved to {}", outcome.log_path.display()));

    if !outcome.status.success() {
        bail!("'{}' exited with {}", program, outcome.status);
    }
    Ok(())
}
