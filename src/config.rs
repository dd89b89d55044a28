use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional overrides read from `config.toml` in the shelf root.
///
/// Every key may be omitted; the workspace fills in XDG defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub bin_dir: Option<String>,
    #[serde(default)]
    pub shell: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}

/// Expand `~` and `$VAR` references in a configured path.
pub fn expand_path(value: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(value)
        .map_err(|err| anyhow::anyhow!("Failed to expand path '{}': {}", value, err))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
