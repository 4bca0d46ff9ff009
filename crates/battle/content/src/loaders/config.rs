//! Battle tuning loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`BattleConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate battle tuning from a TOML file.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} in {}", e, path.display()))?;

        tracing::debug!(path = %path.display(), "battle config loaded");
        Ok(config)
    }

    /// Parse and validate battle tuning from TOML text.
    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battle config TOML: {}", e))?;
        config.validate()?;

        Ok(config)
    }
}
