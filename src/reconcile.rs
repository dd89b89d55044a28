//! Bring the profile and bin directory in line with the registry.
//!
//! Every run tears down all managed artifacts and rebuilds them from the
//! enabled entries, so nothing from an earlier configuration survives.
//! Per-entry failures do not stop the run; they are collected on the
//! [`ApplyReport`]. A failed teardown aborts before anything is rebuilt.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ShelfError};
use crate::links::SymlinkManager;
use crate::profile::{AddOutcome, ProfileInjector};
use crate::registry::{Entry, Kind, Registry};
use crate::shell::Shell;

/// Entry left without an artifact for a recoverable reason.
#[derive(Debug)]
pub struct Skip {
    pub index: usize,
    pub line: usize,
    pub label: String,
    pub reason: String,
}

/// Entry whose artifact could not be materialized.
#[derive(Debug)]
pub struct Failure {
    pub index: usize,
    pub line: usize,
    pub label: String,
    pub error: ShelfError,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub blocks_removed: usize,
    pub links_removed: usize,
    /// Labels of startup entries with a profile block.
    pub blocks: Vec<String>,
    /// Labels of tool entries with a symlink.
    pub links: Vec<String>,
    pub disabled: usize,
    pub skipped: Vec<Skip>,
    pub failures: Vec<Failure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Step {
    Block,
    Link,
    Skip(String),
}

#[derive(Debug)]
pub struct Reconciler {
    profile: ProfileInjector,
    links: SymlinkManager,
    startup_dir: PathBuf,
    tools_dir: PathBuf,
    shell: Shell,
}

impl Reconciler {
    pub fn new(
        profile: ProfileInjector,
        links: SymlinkManager,
        startup_dir: PathBuf,
        tools_dir: PathBuf,
        shell: Shell,
    ) -> Self {
        Self {
            profile,
            links,
            startup_dir,
            tools_dir,
            shell,
        }
    }

    pub fn profile(&self) -> &ProfileInjector {
        &self.profile
    }

    pub fn links(&self) -> &SymlinkManager {
        &self.links
    }

    /// Reset all managed artifacts, then materialize every enabled entry.
    pub fn apply(&self, registry: &Registry) -> Result<ApplyReport> {
        let mut report = ApplyReport {
            blocks_removed: self.profile.reset_all()?,
            links_removed: self.links.reset_all()?,
            ..ApplyReport::default()
        };

        for (index, entry) in registry.iter().enumerate() {
            if !entry.is_enabled() {
                report.disabled += 1;
                continue;
            }

            let label = entry.label().to_string();
            match self.materialize(entry) {
                Ok(Step::Block) => report.blocks.push(label),
                Ok(Step::Link) => report.links.push(label),
                Ok(Step::Skip(reason)) => {
                    debug!(line = entry.line(), entry = %label, "skipping entry: {reason}");
                    report.skipped.push(Skip {
                        index,
                        line: entry.line(),
                        label,
                        reason,
                    });
                }
                Err(err @ ShelfError::MissingReferencedScript { .. }) => {
                    debug!(line = entry.line(), "skipping entry: {err}");
                    report.skipped.push(Skip {
                        index,
                        line: entry.line(),
                        label,
                        reason: err.to_string(),
                    });
                }
                Err(error) => {
                    debug!(line = entry.line(), entry = %label, "failed to apply entry: {error}");
                    report.failures.push(Failure {
                        index,
                        line: entry.line(),
                        label,
                        error,
                    });
                }
            }
        }

        debug!(
            blocks = report.blocks.len(),
            links = report.links.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            "reconciled"
        );
        Ok(report)
    }

    fn materialize(&self, entry: &Entry) -> Result<Step> {
        match &entry.kind {
            Kind::Startup => {
                let script = self.existing_script(&self.startup_dir, entry)?;
                let command = self.shell.source_line(&script);
                let outcome = self.profile.add_block(&command, &entry.description)?;
                if outcome == AddOutcome::AlreadyPresent {
                    debug!(entry = entry.label(), "profile already sources script");
                }
                Ok(Step::Block)
            }
            Kind::Tool => {
                let Some(alias) = entry.alias.as_deref() else {
                    return Ok(Step::Skip(format!(
                        "tool '{}' has no alias",
                        entry.filename
                    )));
                };
                let script = self.existing_script(&self.tools_dir, entry)?;
                self.links.link(&script, alias)?;
                Ok(Step::Link)
            }
            Kind::Unknown(kind) => Ok(Step::Skip(format!("unknown kind '{kind}'"))),
        }
    }

    fn existing_script(&self, dir: &Path, entry: &Entry) -> Result<PathBuf> {
        let script = script_path(dir, &entry.filename);
        if script.is_file() {
            Ok(script)
        } else {
            Err(ShelfError::MissingReferencedScript {
                entry: entry.label().to_string(),
                path: script,
            })
        }
    }
}

/// Absolute, `~` and `$VAR` filenames are used as written; anything else is
/// relative to the kind's script directory.
fn script_path(dir: &Path, filename: &str) -> PathBuf {
    if filename.starts_with(['~', '$', '/']) {
        if let Ok(expanded) = shellexpand::full(filename) {
            return PathBuf::from(expanded.as_ref());
        }
    }
    dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BEGIN_MARKER;
    use crate::registry;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    const SCENARIO_A: &str = "startup:enable::greeting:greet.sh\ntools:disable:gr:grep helper:g.sh\n";

    struct Fixture {
        _temp: TempDir,
        registry: PathBuf,
        root: PathBuf,
        reconciler: Reconciler,
    }

    impl Fixture {
        fn new(contents: &str) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().join("shelf");
            fs::create_dir_all(root.join("startup")).unwrap();
            fs::create_dir_all(root.join("tools")).unwrap();
            fs::write(root.join("startup/greet.sh"), "echo hello\n").unwrap();
            fs::write(root.join("tools/g.sh"), "#!/bin/sh\ngrep \"$@\"\n").unwrap();

            let registry = root.join("scripts.conf");
            fs::write(&registry, contents).unwrap();

            let profile = temp.path().join(".bashrc");
            fs::write(&profile, "export EDITOR=vi\n").unwrap();

            let reconciler = Reconciler::new(
                ProfileInjector::new(profile, temp.path().join("backups")),
                SymlinkManager::new(temp.path().join("bin")),
                root.join("startup"),
                root.join("tools"),
                Shell::Bash,
            );

            Self {
                _temp: temp,
                registry,
                root,
                reconciler,
            }
        }

        fn parse(&self) -> Registry {
            Registry::parse(&self.registry).unwrap()
        }

        fn apply(&self) -> ApplyReport {
            self.reconciler.apply(&self.parse()).unwrap()
        }

        fn profile_text(&self) -> String {
            fs::read_to_string(self.reconciler.profile().path()).unwrap()
        }

        fn links(&self) -> Vec<(String, PathBuf)> {
            self.reconciler.links().links().unwrap()
        }
    }

    #[test]
    fn test_scenario_a_one_block_no_links() {
        let fixture = Fixture::new(SCENARIO_A);

        let report = fixture.apply();

        assert!(report.is_success());
        assert_eq!(report.blocks, vec!["greet.sh"]);
        assert_eq!(report.disabled, 1);
        assert_eq!(fixture.reconciler.profile().block_count().unwrap(), 1);
        assert!(fixture.profile_text().contains("startup/greet.sh"));
        assert!(fixture.links().is_empty());
    }

    #[test]
    fn test_scenario_b_toggle_links_tool() {
        let fixture = Fixture::new(SCENARIO_A);
        let before = fixture.parse();
        registry::toggle(&fixture.registry, 1, &before).unwrap();

        let report = fixture.apply();

        assert_eq!(report.links, vec!["gr"]);
        let links = fixture.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "gr");
        assert_eq!(links[0].1, fixture.root.join("tools/g.sh"));
        let mode = fs::metadata(fixture.root.join("tools/g.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_scenario_d_apply_is_idempotent() {
        let fixture = Fixture::new("startup:enable::greeting:greet.sh\ntools:enable:gr:grep helper:g.sh\n");

        fixture.apply();
        let profile_once = fixture.profile_text();
        let links_once = fixture.links();
        let report = fixture.apply();

        assert_eq!(report.blocks_removed, 1);
        assert_eq!(report.links_removed, 1);
        assert_eq!(fixture.profile_text(), profile_once);
        assert_eq!(fixture.links(), links_once);
        assert_eq!(fixture.profile_text().matches(BEGIN_MARKER).count(), 1);
    }

    #[test]
    fn test_disabling_removes_artifacts() {
        let fixture = Fixture::new("startup:enable::greeting:greet.sh\ntools:enable:gr:grep helper:g.sh\n");
        fixture.apply();
        assert_eq!(fixture.links().len(), 1);

        let registry = fixture.parse();
        registry::toggle(&fixture.registry, 0, &registry).unwrap();
        registry::toggle(&fixture.registry, 1, &registry).unwrap();
        fixture.apply();

        assert_eq!(fixture.profile_text(), "export EDITOR=vi\n");
        assert!(fixture.links().is_empty());
    }

    #[test]
    fn test_missing_script_is_skipped() {
        let fixture = Fixture::new(
            "startup:enable::ghost:ghost.sh\ntools:enable:gt:ghost tool:ghost.sh\nstartup:enable::greeting:greet.sh\n",
        );

        let report = fixture.apply();

        assert!(report.is_success());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, 1);
        assert!(report.skipped[0].reason.contains("ghost.sh"));
        assert_eq!(report.blocks, vec!["greet.sh"]);
        assert!(fixture.links().is_empty());
    }

    #[test]
    fn test_tool_without_alias_and_unknown_kind_are_skipped() {
        let fixture = Fixture::new("tools:enable::no alias:g.sh\nplugin:enable:p:plugin:g.sh\n");

        let report = fixture.apply();

        assert!(report.is_success());
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].reason.contains("no alias"));
        assert!(report.skipped[1].reason.contains("unknown kind 'plugin'"));
        assert!(fixture.links().is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_later_entries() {
        let fixture = Fixture::new(
            "tools:enable:taken:blocked:g.sh\nstartup:enable::greeting:greet.sh\ntools:enable:gr:grep helper:g.sh\n",
        );
        let bin = fixture.reconciler.links().dir().to_path_buf();
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("taken"), "user file").unwrap();

        let report = fixture.apply();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label, "taken");
        assert!(matches!(
            report.failures[0].error,
            ShelfError::SymlinkFailure { .. }
        ));
        assert_eq!(report.blocks, vec!["greet.sh"]);
        assert_eq!(report.links, vec!["gr"]);
        assert_eq!(fs::read_to_string(bin.join("taken")).unwrap(), "user file");
    }

    #[test]
    fn test_absolute_filename_used_as_is() {
        let fixture = Fixture::new("");
        let elsewhere = fixture.root.join("elsewhere.sh");
        fs::write(&elsewhere, "echo\n").unwrap();
        fs::write(
            &fixture.registry,
            format!("tools:enable:el:elsewhere:{}\n", elsewhere.display()),
        )
        .unwrap();

        fixture.apply();

        assert_eq!(fixture.links(), vec![("el".to_string(), elsewhere)]);
    }

    #[test]
    fn test_script_path_relative() {
        assert_eq!(
            script_path(Path::new("/s/tools"), "g.sh"),
            PathBuf::from("/s/tools/g.sh")
        );
        assert_eq!(
            script_path(Path::new("/s/tools"), "/opt/g.sh"),
            PathBuf::from("/opt/g.sh")
        );
    }
}
