//! Turn-based combat rules.
//!
//! The crate is a pure, single-threaded state machine driven by a host tick:
//! - [`stamina`] and [`combatant`] hold per-participant resources
//! - [`window`] classifies parry and QTE presses against their timing windows
//! - [`input`] decides which raw presses become semantic requests
//! - [`turn`] tracks battle phase and per-side sub-states
//! - [`battle`] wires everything together and owns the encounter outcome
//!
//! Nothing here reads a clock; hosts pass [`Millis`] timestamps in.
pub mod action;
pub mod battle;
pub mod capabilities;
pub mod combatant;
pub mod config;
pub mod error;
pub mod input;
pub mod notify;
pub mod scheduler;
pub mod stamina;
pub mod time;
pub mod turn;
pub mod window;

pub use action::{ActionKind, ActionSpec, ActionTable, QteBonus};
pub use battle::{
    Battle, BattleBuilder, BattleEvent, BattleResult, BattleSnapshot, DamageSource,
};
pub use capabilities::{
    BasicAttacker, BattleFeedback, EnemyBrain, EnemyIntent, HapticPulse, NoFeedback,
};
pub use combatant::{
    Combatant, CombatantSnapshot, CombatantSpec, DamageReport, HealthChanged, Side,
};
pub use config::{
    BattleConfig, ConfigError, CounterConfig, EnemyAttackSpec, EnemyTiming, ParryRewards,
    PlayerTiming, WindowConfig,
};
pub use error::{BattleSetupError, ErrorSeverity};
pub use input::{
    GateEvent, InputGate, InputPermission, InputVerdict, PressOutcome, RejectReason,
};
pub use notify::{Signal, Subscription};
pub use scheduler::{Due, Scheduler, TaskId};
pub use stamina::{StaminaChanged, StaminaResource};
pub use time::Millis;
pub use turn::{BattleState, EnemyTurnState, PlayerTurnState, TurnEvent, TurnStateMachine};
pub use window::{FailReason, TimingWindow, WindowEvent, WindowKind, WindowOutcome};
