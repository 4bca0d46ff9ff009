//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the frame loop and campaign code can stay focused on orchestration.

pub mod errors;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use providers::{InputProvider, PlannedInput, Press, ScriptedProvider};
