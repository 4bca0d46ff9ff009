//! Battle tuning data.
//!
//! Everything numeric the orchestrator needs (costs, damage, window lengths,
//! delays) lives here and is supplied at construction time.

use crate::action::{ActionKind, ActionTable};
use crate::time::Millis;
use crate::window::WindowKind;

/// Errors raised by [`BattleConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{kind} window duration must be greater than zero")]
    EmptyWindow { kind: WindowKind },

    #[error(
        "{kind} perfect tolerance {tolerance} exceeds half of the window duration {duration}"
    )]
    ToleranceTooWide {
        kind: WindowKind,
        tolerance: Millis,
        duration: Millis,
    },

    #[error("action {kind} deals no damage")]
    HarmlessAction { kind: ActionKind },

    #[error("enemy attack deals no damage")]
    HarmlessEnemy,

    #[error("combatant '{name}' has no health")]
    ZeroHealth { name: String },
}

/// Duration and "perfect" tolerance of a timing window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowConfig {
    pub duration: Millis,
    /// Half-width of the perfect band centred on `duration / 2`.
    pub perfect_tolerance: Millis,
}

impl WindowConfig {
    pub const fn new(duration: Millis, perfect_tolerance: Millis) -> Self {
        Self {
            duration,
            perfect_tolerance,
        }
    }

    fn validate(&self, kind: WindowKind) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::EmptyWindow { kind });
        }
        if self.perfect_tolerance.as_u64().saturating_mul(2) > self.duration.as_u64() {
            return Err(ConfigError::ToleranceTooWide {
                kind,
                tolerance: self.perfect_tolerance,
                duration: self.duration,
            });
        }
        Ok(())
    }
}

/// Stamina granted to the player on a successful parry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParryRewards {
    pub success_stamina: u32,
    pub perfect_stamina: u32,
}

impl ParryRewards {
    pub const fn for_outcome(&self, perfect: bool) -> u32 {
        if perfect {
            self.perfect_stamina
        } else {
            self.success_stamina
        }
    }
}

/// Counter-attack that follows a successful parry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterConfig {
    pub damage: u32,
    /// Wait between the parry and the counter hit.
    pub delay: Millis,
    /// Wait between the counter hit and the end of the enemy turn.
    pub recovery: Millis,
}

/// The enemy's single attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyAttackSpec {
    pub damage: u32,
    pub stamina_cost: u32,
}

/// Enemy turn pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTiming {
    /// Time spent in `Thinking` before the attack starts.
    pub thinking: Millis,
    /// Attack wind-up before the parry window opens.
    pub windup: Millis,
    /// Pause after the attack resolves before the turn ends.
    pub recovery: Millis,
}

/// Player action pacing (stands in for animation hit frames).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerTiming {
    /// Wind-up before the hit lands (or the QTE window opens).
    pub hit_delay: Millis,
    /// Pause after the hit before the action completes.
    pub recovery: Millis,
}

/// Complete tuning for one battle orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    pub actions: ActionTable,
    pub parry: WindowConfig,
    pub qte: WindowConfig,
    pub rewards: ParryRewards,
    pub counter: CounterConfig,
    pub enemy_attack: EnemyAttackSpec,
    pub enemy_timing: EnemyTiming,
    pub player_timing: PlayerTiming,
    /// Accept one action request while another action is still executing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub queue_during_action: bool,
}

impl BattleConfig {
    pub const DEFAULT_PARRY_WINDOW: WindowConfig = WindowConfig::new(Millis(300), Millis(100));
    pub const DEFAULT_QTE_WINDOW: WindowConfig = WindowConfig::new(Millis(500), Millis(100));

    pub fn new() -> Self {
        Self {
            actions: ActionTable::default(),
            parry: Self::DEFAULT_PARRY_WINDOW,
            qte: Self::DEFAULT_QTE_WINDOW,
            rewards: ParryRewards {
                success_stamina: 15,
                perfect_stamina: 30,
            },
            counter: CounterConfig {
                damage: 25,
                delay: Millis(500),
                recovery: Millis(500),
            },
            enemy_attack: EnemyAttackSpec {
                damage: 15,
                stamina_cost: 20,
            },
            enemy_timing: EnemyTiming {
                thinking: Millis(800),
                windup: Millis(400),
                recovery: Millis(600),
            },
            player_timing: PlayerTiming {
                hit_delay: Millis(300),
                recovery: Millis(400),
            },
            queue_during_action: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parry.validate(WindowKind::Parry)?;
        self.qte.validate(WindowKind::Qte)?;

        for kind in [
            ActionKind::LightAttack,
            ActionKind::HeavyAttack,
            ActionKind::Skill1,
            ActionKind::Skill2,
        ] {
            if self.actions.get(kind).is_some_and(|spec| spec.damage == 0) {
                return Err(ConfigError::HarmlessAction { kind });
            }
        }

        if self.enemy_attack.damage == 0 {
            return Err(ConfigError::HarmlessEnemy);
        }

        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
