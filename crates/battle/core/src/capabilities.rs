//! Capabilities injected into the orchestrator at construction.
//!
//! Presentation side effects (haptics, on-screen input prompts, the victory
//! hook) and the enemy's decision are reached through these traits rather than
//! process-wide managers, so every battle can be built and torn down in
//! isolation.

use crate::combatant::Combatant;
use crate::config::EnemyAttackSpec;
use crate::window::WindowKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HapticPulse {
    Light,
    Strong,
}

/// One-way presentation hooks. Every method defaults to a no-op.
pub trait BattleFeedback {
    fn haptic(&mut self, _pulse: HapticPulse) {}

    /// A timing window opened and its button prompt should be shown.
    fn show_prompt(&mut self, _window: WindowKind) {}

    fn hide_prompt(&mut self) {}

    /// The enemy fell; play the victory sequence.
    fn play_victory(&mut self) {}
}

/// Feedback sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeedback;

impl BattleFeedback for NoFeedback {}

/// What the enemy decided to do this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyIntent {
    pub damage: u32,
    pub stamina_cost: u32,
}

impl From<EnemyAttackSpec> for EnemyIntent {
    fn from(spec: EnemyAttackSpec) -> Self {
        Self {
            damage: spec.damage,
            stamina_cost: spec.stamina_cost,
        }
    }
}

/// The enemy's "thinking" step. Called once per enemy turn.
pub trait EnemyBrain {
    fn decide(&mut self, enemy: &Combatant, player: &Combatant) -> EnemyIntent;
}

/// Always performs the configured attack.
#[derive(Clone, Copy, Debug)]
pub struct BasicAttacker {
    attack: EnemyAttackSpec,
}

impl BasicAttacker {
    pub const fn new(attack: EnemyAttackSpec) -> Self {
        Self { attack }
    }
}

impl EnemyBrain for BasicAttacker {
    fn decide(&mut self, _enemy: &Combatant, _player: &Combatant) -> EnemyIntent {
        self.attack.into()
    }
}
