//! Presentation hooks for headless hosts.
use battle_core::{BattleFeedback, HapticPulse, WindowKind};

/// Reports feedback requests to the log instead of a screen or controller.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceFeedback;

impl BattleFeedback for TraceFeedback {
    fn haptic(&mut self, pulse: HapticPulse) {
        tracing::debug!(%pulse, "haptic");
    }

    fn show_prompt(&mut self, kind: WindowKind) {
        tracing::debug!(%kind, "prompt shown");
    }

    fn hide_prompt(&mut self) {
        tracing::debug!("prompt hidden");
    }

    fn play_victory(&mut self) {
        tracing::info!("victory");
    }
}
