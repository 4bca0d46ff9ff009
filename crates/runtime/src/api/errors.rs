//! Unified error types surfaced by the runtime API.
//!
//! Wraps battle setup failures, content lookups and runaway encounters so
//! clients can bubble them up with consistent context.
use battle_core::{BattleSetupError, ConfigError, Millis};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a player combatant before building")]
    MissingPlayer,

    #[error("combatant '{id}' not found in roster")]
    UnknownCombatant { id: String },

    #[error("scenario '{name}' has no encounters")]
    EmptyScenario { name: String },

    #[error("encounter {encounter} did not finish within {limit}")]
    EncounterTimeout { encounter: u32, limit: Millis },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Setup(#[from] BattleSetupError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
