//! Scripted campaigns.
//!
//! A scenario names the player from the roster and lists the enemies to
//! fight in order, each with the inputs the scripted player will press.
//! Inputs use the [`PlannedInput`] vocabulary:
//!
//! ```ron
//! (
//!     name: "tutorial",
//!     player: "hero",
//!     encounters: [
//!         (enemy: "slime", inputs: [action(light_attack), action(end_turn), parry(at: 150)]),
//!     ],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::{PlannedInput, Result, RuntimeError, ScriptedProvider};

/// One fight of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSpec {
    /// Roster id of the enemy.
    pub enemy: String,
    /// Presses for this fight. When they run out the player passes turns.
    #[serde(default)]
    pub inputs: Vec<PlannedInput>,
}

impl EncounterSpec {
    pub fn new(enemy: impl Into<String>, inputs: Vec<PlannedInput>) -> Self {
        Self {
            enemy: enemy.into(),
            inputs,
        }
    }

    pub fn provider(&self) -> ScriptedProvider {
        ScriptedProvider::new(self.inputs.iter().copied())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Roster id of the player.
    #[serde(default = "default_player")]
    pub player: String,
    pub encounters: Vec<EncounterSpec>,
}

fn default_player() -> String {
    "hero".to_string()
}

impl Scenario {
    pub fn new(name: impl Into<String>, player: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player: player.into(),
            encounters: Vec::new(),
        }
    }

    pub fn with_encounter(mut self, encounter: EncounterSpec) -> Self {
        self.encounters.push(encounter);
        self
    }

    /// Roster ids referenced by the scenario, player first.
    pub fn combatant_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.player.as_str())
            .chain(self.encounters.iter().map(|e| e.enemy.as_str()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.encounters.is_empty() {
            return Err(RuntimeError::EmptyScenario {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Parses RON text and validates the result.
    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content).map_err(|e| {
            RuntimeError::InvalidScenario(format!("Failed to parse scenario RON: {}", e))
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidScenario(format!(
                "Failed to read scenario file {}: {}",
                path.display(),
                e
            ))
        })?;

        let scenario = Self::parse(&content)?;
        tracing::debug!(
            name = %scenario.name,
            encounters = scenario.encounters.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActionKind, Millis};

    #[test]
    fn parses_planned_inputs() {
        let scenario = Scenario::parse(
            r#"(
                name: "duel",
                encounters: [
                    (enemy: "slime", inputs: [
                        action(heavy_attack),
                        qte(at: 250),
                        action(end_turn),
                        skip_parry,
                    ]),
                    (enemy: "goblin"),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(scenario.player, "hero");
        assert_eq!(
            scenario.encounters[0].inputs,
            vec![
                PlannedInput::Action(ActionKind::HeavyAttack),
                PlannedInput::Qte { at: Millis(250) },
                PlannedInput::Action(ActionKind::EndTurn),
                PlannedInput::SkipParry,
            ]
        );
        assert!(scenario.encounters[1].inputs.is_empty());
        assert_eq!(
            scenario.combatant_ids().collect::<Vec<_>>(),
            ["hero", "slime", "goblin"]
        );
    }

    #[test]
    fn rejects_empty_scenarios() {
        let err = Scenario::parse(r#"(name: "nothing", encounters: [])"#).unwrap_err();
        assert!(matches!(err, RuntimeError::EmptyScenario { name } if name == "nothing"));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = Scenario::parse("(name: ").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidScenario(_)));
    }
}
