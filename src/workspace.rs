use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::{expand_path, Config};
use crate::error::ShelfError;
use crate::links::SymlinkManager;
use crate::profile::ProfileInjector;
use crate::reconcile::Reconciler;
use crate::registry::Registry;
use crate::shell::Shell;
use crate::toggle::ToggleService;
use crate::util::xdg;

/// Registry written by `shelf init` when none exists yet
const REGISTRY_TEMPLATE: &str = include_str!("../templates/scripts.conf");

/// Workspace path types
#[derive(Debug, Clone, Copy)]
pub enum WorkspacePath {
    /// Workspace root: $XDG_CONFIG_HOME/shelf
    Root,
    /// Optional overrides: root/config.toml
    ConfigFile,
    /// Registry file: root/scripts.conf unless overridden
    Registry,
    /// Startup scripts: root/startup
    Startup,
    /// Tool scripts: root/tools
    Tools,
    /// State directory: $XDG_STATE_HOME/shelf
    State,
    /// Bin directory: state/bin unless overridden
    Bin,
    /// Profile backups: state/backups
    Backups,
    /// Command logs: state/logs
    Logs,
}

/// Workspace - where shelf keeps its registry, scripts and generated state
///
/// The root (`$XDG_CONFIG_HOME/shelf`) is meant to be version controlled; the
/// state directory (`$XDG_STATE_HOME/shelf`) is local to the machine.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    state_dir: PathBuf,
    home: PathBuf,
    config: Config,
}

impl Workspace {
    /// Create a workspace from XDG locations and `config.toml`
    pub fn new() -> Result<Self> {
        Self::with_dirs(xdg::config_dir()?, xdg::state_dir()?, xdg::home_dir()?)
    }

    pub fn with_dirs(root: PathBuf, state_dir: PathBuf, home: PathBuf) -> Result<Self> {
        let config = Config::load(&root.join("config.toml"))?;
        Ok(Self {
            root,
            state_dir,
            home,
            config,
        })
    }

    /// Get path for a specific workspace location
    pub fn path(&self, path_type: WorkspacePath) -> PathBuf {
        match path_type {
            WorkspacePath::Root => self.root.clone(),
            WorkspacePath::ConfigFile => self.root.join("config.toml"),
            WorkspacePath::Registry => self
                .configured(self.config.registry.as_deref())
                .unwrap_or_else(|| self.root.join("scripts.conf")),
            WorkspacePath::Startup => self.root.join("startup"),
            WorkspacePath::Tools => self.root.join("tools"),
            WorkspacePath::State => self.state_dir.clone(),
            WorkspacePath::Bin => self
                .configured(self.config.bin_dir.as_deref())
                .unwrap_or_else(|| self.state_dir.join("bin")),
            WorkspacePath::Backups => self.state_dir.join("backups"),
            WorkspacePath::Logs => self.state_dir.join("logs"),
        }
    }

    fn configured(&self, value: Option<&str>) -> Option<PathBuf> {
        let value = value?;
        match expand_path(value) {
            Ok(path) if path.is_relative() => Some(self.root.join(path)),
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!("ignoring configured path: {err:#}");
                None
            }
        }
    }

    /// Shell from `config.toml`, else `$SHELL`
    pub fn shell(&self) -> Shell {
        self.config
            .shell
            .as_deref()
            .and_then(Shell::from_name)
            .unwrap_or_else(Shell::detect)
    }

    /// The user's shell profile that receives managed blocks
    pub fn profile_path(&self) -> PathBuf {
        match self.config.profile.as_deref() {
            Some(profile) => match expand_path(profile) {
                Ok(path) if path.is_relative() => self.home.join(path),
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!("ignoring configured profile: {err:#}");
                    self.shell().rc_file(&self.home)
                }
            },
            None => self.shell().rc_file(&self.home),
        }
    }

    /// Parse the registry file
    pub fn registry(&self) -> Result<Registry> {
        let path = self.path(WorkspacePath::Registry);
        Registry::parse(&path).map_err(|err| match err {
            ShelfError::NotFound { .. } => {
                anyhow::Error::new(err).context("No registry found; run 'shelf init' to create one")
            }
            other => other.into(),
        })
    }

    pub fn profile_injector(&self) -> ProfileInjector {
        ProfileInjector::new(self.profile_path(), self.path(WorkspacePath::Backups))
    }

    pub fn symlink_manager(&self) -> SymlinkManager {
        SymlinkManager::new(self.path(WorkspacePath::Bin))
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            self.profile_injector(),
            self.symlink_manager(),
            self.path(WorkspacePath::Startup),
            self.path(WorkspacePath::Tools),
            self.shell(),
        )
    }

    pub fn toggle_service(&self) -> ToggleService {
        ToggleService::new(self.path(WorkspacePath::Registry))
    }

    /// Create the workspace directories and a sample registry
    ///
    /// Returns `true` when a new registry was written. An existing registry
    /// is never overwritten.
    pub fn init(&self) -> Result<bool> {
        for dir in [
            self.path(WorkspacePath::Startup),
            self.path(WorkspacePath::Tools),
            self.path(WorkspacePath::Bin),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
        }

        let registry = self.path(WorkspacePath::Registry);
        if registry.exists() {
            return Ok(false);
        }

        if let Some(parent) = registry.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(&registry, REGISTRY_TEMPLATE)
            .with_context(|| format!("Failed to write registry {:?}", registry))?;
        Ok(true)
    }
}
