//! Data-driven battle content.
//!
//! This crate holds the combatant roster model and, behind the `loaders`
//! feature, loaders for the data files that tune an encounter:
//! - Battle tuning (TOML, [`battle_core::BattleConfig`])
//! - Combatant rosters (RON, `Vec<(String, CombatantSpec)>`)
//!
//! Content is read once at startup and never mutated by a running battle.

pub mod roster;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use roster::Roster;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, RosterLoader};
