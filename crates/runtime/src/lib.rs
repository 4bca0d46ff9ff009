//! Host runtime for the battle core.
//!
//! This crate plays the role of the game engine around [`battle_core`]: it
//! owns the battle clock, polls input providers once per frame, records
//! every battle notification and turns finished encounters into reports.
//! Consumers embed [`Runtime`] to fight single encounters or whole
//! [`Scenario`] campaigns.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the frame loop, the encounter session and the builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] records battle notifications and summarises them
//! - [`scenario`] loads scripted campaigns
pub mod api;
pub mod config;
pub mod events;
pub mod feedback;
pub mod runtime;
pub mod scenario;

pub use api::{InputProvider, PlannedInput, Press, Result, RuntimeError, ScriptedProvider};
pub use config::RuntimeConfig;
pub use events::{CampaignReport, EncounterReport, EventRecorder, RecordedEvent, WindowStats};
pub use feedback::TraceFeedback;
pub use runtime::{EncounterSession, Runtime, RuntimeBuilder};
pub use scenario::{EncounterSpec, Scenario};
