//! Encounter event capture and summaries.
//!
//! [`EventRecorder`] subscribes to a battle's notifications and stamps each
//! with the battle clock; [`EncounterReport`] and [`CampaignReport`] condense
//! a recorded encounter into the figures clients print or persist.

mod recorder;
mod report;

pub use recorder::{EventRecorder, RecordedEvent};
pub use report::{CampaignReport, EncounterReport, WindowStats};
