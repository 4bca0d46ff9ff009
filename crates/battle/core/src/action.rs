//! Player action catalogue.
//!
//! [`ActionKind`] is the semantic vocabulary produced by the input gate.
//! [`ActionTable`] holds the tuning data for each kind (stamina cost, damage,
//! optional QTE bonus). Costs and damage are configuration, never hard-coded in
//! the orchestrator's control flow.

use crate::turn::PlayerTurnState;

/// Semantic player actions accepted by the input gate.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ActionKind {
    LightAttack,
    HeavyAttack,
    #[strum(serialize = "skill1")]
    #[cfg_attr(feature = "serde", serde(rename = "skill1"))]
    Skill1,
    #[strum(serialize = "skill2")]
    #[cfg_attr(feature = "serde", serde(rename = "skill2"))]
    Skill2,
    EndTurn,
}

impl ActionKind {
    /// Player sub-state entered while this action executes.
    pub const fn executing_state(self) -> Option<PlayerTurnState> {
        match self {
            ActionKind::LightAttack | ActionKind::HeavyAttack => {
                Some(PlayerTurnState::ExecutingAttack)
            }
            ActionKind::Skill1 | ActionKind::Skill2 => Some(PlayerTurnState::ExecutingSkill),
            ActionKind::EndTurn => None,
        }
    }
}

/// Damage multipliers (in percent) applied when an action's QTE resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QteBonus {
    pub success_percent: u32,
    pub perfect_percent: u32,
}

impl QteBonus {
    pub const fn new(success_percent: u32, perfect_percent: u32) -> Self {
        Self {
            success_percent,
            perfect_percent,
        }
    }
}

/// Tuning for a single combat action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSpec {
    pub stamina_cost: u32,
    pub damage: u32,
    /// When present the action opens a QTE window before the hit lands.
    #[cfg_attr(feature = "serde", serde(default))]
    pub qte: Option<QteBonus>,
}

impl ActionSpec {
    pub const fn new(stamina_cost: u32, damage: u32) -> Self {
        Self {
            stamina_cost,
            damage,
            qte: None,
        }
    }

    pub const fn with_qte(mut self, bonus: QteBonus) -> Self {
        self.qte = Some(bonus);
        self
    }
}

/// Per-kind action tuning. `EndTurn` has no entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionTable {
    pub light_attack: ActionSpec,
    pub heavy_attack: ActionSpec,
    pub skill1: ActionSpec,
    pub skill2: ActionSpec,
}

impl ActionTable {
    pub fn get(&self, kind: ActionKind) -> Option<&ActionSpec> {
        match kind {
            ActionKind::LightAttack => Some(&self.light_attack),
            ActionKind::HeavyAttack => Some(&self.heavy_attack),
            ActionKind::Skill1 => Some(&self.skill1),
            ActionKind::Skill2 => Some(&self.skill2),
            ActionKind::EndTurn => None,
        }
    }

    /// Stamina cost of `kind`. Ending the turn is free.
    pub fn cost_of(&self, kind: ActionKind) -> u32 {
        self.get(kind).map_or(0, |spec| spec.stamina_cost)
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            light_attack: ActionSpec::new(15, 10),
            heavy_attack: ActionSpec::new(35, 20).with_qte(QteBonus::new(150, 200)),
            skill1: ActionSpec::new(50, 30).with_qte(QteBonus::new(130, 170)),
            skill2: ActionSpec::new(70, 45),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn end_turn_is_free_and_has_no_spec() {
        let table = ActionTable::default();
        assert!(table.get(ActionKind::EndTurn).is_none());
        assert_eq!(table.cost_of(ActionKind::EndTurn), 0);
    }

    #[test]
    fn only_end_turn_lacks_an_executing_state() {
        for kind in ActionKind::iter() {
            assert_eq!(
                kind == ActionKind::EndTurn,
                kind.executing_state().is_none()
            );
        }
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!("light_attack".parse::<ActionKind>(), Ok(ActionKind::LightAttack));
        assert_eq!("Skill1".parse::<ActionKind>(), Ok(ActionKind::Skill1));
        assert_eq!(ActionKind::EndTurn.to_string(), "end_turn");
    }
}
