//! Flip one registry entry between enabled and disabled.
//!
//! Toggling only persists the change. Callers re-parse the registry and run
//! the reconciler when the new state should take effect.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::registry::{self, Registry, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub index: usize,
    pub label: String,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct ToggleService {
    registry_path: PathBuf,
}

impl ToggleService {
    pub fn new(registry_path: impl Into<PathBuf>) -> Self {
        Self {
            registry_path: registry_path.into(),
        }
    }

    /// Persist the flipped status of entry `index` of the `registry` snapshot.
    pub fn toggle(&self, index: i64, registry: &Registry) -> Result<Toggled> {
        let position = registry.checked_index(index)?;
        let status = registry::toggle(&self.registry_path, index, registry)?;
        let label = registry
            .get(position)
            .map(|entry| entry.label().to_string())
            .unwrap_or_default();
        debug!(index = position, entry = %label, status = %status, "toggled entry");

        Ok(Toggled {
            index: position,
            label,
            status,
        })
    }
}
