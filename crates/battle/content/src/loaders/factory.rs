//! Content factory for loading every battle data file from one directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::loaders::{ConfigLoader, LoadResult, RosterLoader};
use crate::roster::Roster;

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── roster.ron
/// └── scenarios/
///     ├── tutorial.ron
///     └── gauntlet.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle tuning from `battle.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("battle.toml"))
    }

    /// Load combatant templates from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Roster> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }

    /// Path of `scenarios/{name}.ron`.
    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("scenarios").join(format!("{}.ron", name))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
