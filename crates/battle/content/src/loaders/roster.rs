//! Combatant roster loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::roster::Roster;

/// Loader for combatant rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load a roster from a RON file.
    ///
    /// RON format: `Vec<(String, CombatantSpec)>`
    ///
    /// Every template must have health and every id must be unique.
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        let roster = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} in {}", e, path.display()))?;

        tracing::debug!(path = %path.display(), combatants = roster.len(), "roster loaded");
        Ok(roster)
    }

    pub fn parse(content: &str) -> LoadResult<Roster> {
        let roster: Roster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        if let Some(duplicate) = roster.validate()? {
            anyhow::bail!("Duplicate combatant id '{}'", duplicate);
        }

        Ok(roster)
    }
}
