// Public API
pub mod cli;
pub mod commands;

// Core domain types
mod error;
mod links;
mod profile;
mod reconcile;
mod registry;
mod toggle;

// Workspace and ambient support
mod config;
mod shell;
mod ui;
mod util;
mod workspace;

// Standalone utilities
mod archive;
mod runlog;
mod sweep;

// Re-export main types
pub use config::Config;
pub use error::ShelfError;
pub use links::SymlinkManager;
pub use profile::{AddOutcome, ProfileInjector, BEGIN_MARKER, END_MARKER};
pub use reconcile::{ApplyReport, Failure, Reconciler, Skip};
pub use registry::{toggle as toggle_entry, Entry, Kind, ParseWarning, Registry, Status};
pub use shell::Shell;
pub use toggle::{ToggleService, Toggled};
pub use workspace::{Workspace, WorkspacePath};
