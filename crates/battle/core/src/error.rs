//! Errors raised while setting up a battle.
//!
//! Gameplay-time misuse (out-of-phase input, pressing into a closed window,
//! insufficient stamina) is not represented here: those are normal outcomes
//! handled where they are detected. Only construction and encounter start
//! can fail.

use crate::config::ConfigError;
use crate::turn::BattleState;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid input that should be rejected without retry.
    Validation,

    /// A required collaborator is missing; the battle cannot start.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleSetupError {
    #[error("battle requires a player combatant")]
    MissingPlayer,

    #[error("battle requires an enemy combatant before it can start")]
    MissingEnemy,

    #[error("cannot {operation} while the battle is in state {state}")]
    InProgress {
        operation: &'static str,
        state: BattleState,
    },

    #[error("invalid battle configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl BattleSetupError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingPlayer | Self::MissingEnemy => ErrorSeverity::Fatal,
            Self::InProgress { .. } | Self::InvalidConfig(_) => ErrorSeverity::Validation,
        }
    }
}
