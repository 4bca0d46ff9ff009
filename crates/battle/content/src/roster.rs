//! Named combatant templates.

use battle_core::{Combatant, CombatantSpec, ConfigError, Side};

/// Ordered list of `(id, spec)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Roster {
    entries: Vec<(String, CombatantSpec)>,
}

impl Roster {
    pub fn new(entries: Vec<(String, CombatantSpec)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CombatantSpec> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, spec)| spec)
    }

    /// Spawns a fresh combatant from the template `id`.
    pub fn spawn(&self, id: &str, side: Side) -> Option<Combatant> {
        self.get(id).map(|spec| Combatant::from_spec(side, spec))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Validates every template and returns the first duplicate id, if any.
    pub fn validate(&self) -> Result<Option<&str>, ConfigError> {
        for (_, spec) in &self.entries {
            spec.validate()?;
        }

        let duplicate = self.entries.iter().enumerate().find_map(|(index, (id, _))| {
            self.entries[..index]
                .iter()
                .any(|(earlier, _)| earlier == id)
                .then_some(id.as_str())
        });
        Ok(duplicate)
    }
}
