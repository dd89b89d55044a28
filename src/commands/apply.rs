use crate::registry::Registry;
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace) -> Result<()> {
    let registry = super::load_registry(workspace)?;
    apply_registry(workspace, &registry)
}

pub(super) fn apply_registry(workspace: &Workspace, registry: &Registry) -> Result<()> {
    let progress = ui::Progress::new("Applying", format!("{} entries", registry.len()));

    let report = match workspace.reconciler().apply(registry) {
        Ok(report) => report,
        Err(err) => {
            progress.fail("Failed", &err);
            return Err(err.into());
        }
    };

    for skip in &report.skipped {
        ui::warn(format!("line {} ({}): {}", skip.line, skip.label, skip.reason));
    }
    for failure in &report.failures {
        ui::error(format!(
            "line {} ({}): {}",
            failure.line, failure.label, failure.error
        ));
    }

    let summary = format!(
        "({} profile block(s), {} link(s), {} disabled)",
        report.blocks.len(),
        report.links.len(),
        report.disabled
    );
    if report.is_success() {
        progress.success("Applied", Some(summary));
        Ok(())
    } else {
        progress.fail("Failed", summary);
        anyhow::bail!(
            "Apply finished with {} failed entr{}",
            report.failures.len(),
            if report.failures.len() == 1 { "y" } else { "ies" }
        )
    }
}
