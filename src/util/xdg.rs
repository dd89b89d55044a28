use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "shelf";

/// Get the XDG config directory for shelf
///
/// Returns `$XDG_CONFIG_HOME/shelf` or `~/.config/shelf` if not set
pub fn config_dir() -> Result<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME").filter(|value| !value.is_empty()) {
        Some(value) => PathBuf::from(value),
        None => home_dir()?.join(".config"),
    };

    Ok(base.join(APP_DIR))
}

/// Get the XDG state directory for shelf
///
/// Returns `$XDG_STATE_HOME/shelf` or `~/.local/state/shelf` if not set
pub fn state_dir() -> Result<PathBuf> {
    let base = match env::var_os("XDG_STATE_HOME").filter(|value| !value.is_empty()) {
        Some(value) => PathBuf::from(value),
        None => home_dir()?.join(".local/state"),
    };

    Ok(base.join(APP_DIR))
}

/// Get the home directory
///
/// `$HOME` wins when set so the profile location follows the invoking user.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os("HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    directories::BaseDirs::new()
        .context("Failed to get home directory")
        .map(|bd| bd.home_dir().to_path_buf())
}
