//! Host-side runtime configuration.
use std::env;

use battle_core::Millis;

/// Pacing of the simulated host loop.
///
/// Battle tuning lives in [`battle_core::BattleConfig`]; this only controls
/// how the runtime feeds the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Simulated frame length. The battle result does not depend on it,
    /// only the number of host steps does.
    pub frame: Millis,
    /// Battle time after which an encounter is abandoned.
    pub max_encounter: Millis,
    /// Upper bound on presses dispatched within one frame.
    pub max_presses_per_frame: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame: Millis(16),
            max_encounter: Millis::from_secs(300),
            max_presses_per_frame: 8,
        }
    }
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_FRAME_MS` - Simulated frame length (default: 16, minimum 1)
    /// - `BATTLE_MAX_ENCOUNTER_MS` - Encounter time limit (default: 300000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(frame) = read_env::<u64>("BATTLE_FRAME_MS") {
            config.frame = Millis(frame.max(1));
        }
        if let Some(limit) = read_env::<u64>("BATTLE_MAX_ENCOUNTER_MS") {
            config.max_encounter = Millis(limit);
        }

        config
    }

    pub fn with_frame(mut self, frame: Millis) -> Self {
        self.frame = Millis(frame.as_u64().max(1));
        self
    }

    pub fn with_max_encounter(mut self, limit: Millis) -> Self {
        self.max_encounter = limit;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
