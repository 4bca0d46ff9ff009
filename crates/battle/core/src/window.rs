//! Timing windows for parry and QTE inputs.
//!
//! A [`TimingWindow`] models one bounded opportunity for a correctly timed
//! press. Once opened it accepts at most one input and closes either when that
//! input is classified or when the window times out.
//!
//! Classification uses elapsed battle time, not tick counts:
//! - `elapsed >= duration` → Fail
//! - `|elapsed - duration / 2| <= perfect_tolerance` → Success (perfect)
//! - otherwise → Success
//!
//! The perfect band is inclusive on both edges.

use crate::config::WindowConfig;
use crate::notify::{Signal, Subscription};
use crate::time::Millis;

/// Which mini-game a window belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum WindowKind {
    Parry,
    Qte,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FailReason {
    /// No input arrived before the deadline.
    TimedOut,
    /// Input arrived at or after the deadline, before the timeout was ticked.
    Late,
}

/// Terminal classification of a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum WindowOutcome {
    Success { perfect: bool },
    Fail { reason: FailReason },
}

impl WindowOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, WindowOutcome::Success { .. })
    }

    pub const fn is_perfect(&self) -> bool {
        matches!(self, WindowOutcome::Success { perfect: true })
    }
}

/// Notifications emitted by a [`TimingWindow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum WindowEvent {
    Opened { kind: WindowKind, at: Millis },
    Succeeded { kind: WindowKind, perfect: bool },
    Failed { kind: WindowKind, reason: FailReason },
    /// `success` is false for failures and cancellations.
    Closed { kind: WindowKind, success: bool },
}

impl WindowConfig {
    /// Classifies an input `elapsed` after the window opened.
    pub fn classify(&self, elapsed: Millis) -> WindowOutcome {
        if elapsed >= self.duration {
            return WindowOutcome::Fail {
                reason: FailReason::Late,
            };
        }

        // Compared in half-milliseconds so odd durations keep a centred band.
        let deviation = elapsed.as_u64().saturating_mul(2).abs_diff(self.duration.as_u64());
        WindowOutcome::Success {
            perfect: deviation <= self.perfect_tolerance.as_u64().saturating_mul(2),
        }
    }
}

#[derive(Debug)]
pub struct TimingWindow {
    kind: WindowKind,
    config: WindowConfig,
    opened_at: Option<Millis>,
    consumed: bool,
    last_outcome: Option<WindowOutcome>,
    events: Signal<WindowEvent>,
}

impl TimingWindow {
    pub fn new(kind: WindowKind, config: WindowConfig) -> Self {
        Self {
            kind,
            config,
            opened_at: None,
            consumed: false,
            last_outcome: None,
            events: Signal::new(),
        }
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    pub fn opened_at(&self) -> Option<Millis> {
        self.opened_at
    }

    /// Time at which an unconsumed window times out.
    pub fn deadline(&self) -> Option<Millis> {
        self.opened_at.map(|start| start + self.config.duration)
    }

    pub fn elapsed(&self, now: Millis) -> Option<Millis> {
        self.opened_at.map(|start| now.since(start))
    }

    /// Outcome of the most recently closed window, if it was classified.
    pub fn last_outcome(&self) -> Option<WindowOutcome> {
        self.last_outcome
    }

    /// Opens the window at `now`. No-op (returns false) if already open; the
    /// running timer is left untouched.
    pub fn open(&mut self, now: Millis) -> bool {
        if let Some(start) = self.opened_at {
            tracing::warn!(kind = %self.kind, opened_at = %start, "window already open");
            return false;
        }

        self.opened_at = Some(now);
        self.consumed = false;
        self.last_outcome = None;
        tracing::trace!(kind = %self.kind, at = %now, "window opened");
        self.events.emit(&WindowEvent::Opened {
            kind: self.kind,
            at: now,
        });
        true
    }

    /// Advances the window clock. Returns `Some(Fail)` when the window times out.
    pub fn tick(&mut self, now: Millis) -> Option<WindowOutcome> {
        let elapsed = self.elapsed(now)?;
        if self.consumed || elapsed < self.config.duration {
            return None;
        }

        let outcome = WindowOutcome::Fail {
            reason: FailReason::TimedOut,
        };
        self.finish(outcome);
        Some(outcome)
    }

    /// Classifies a press at `now`. Ignored (returns `None`) when the window
    /// is closed or has already accepted an input.
    pub fn submit_input(&mut self, now: Millis) -> Option<WindowOutcome> {
        let Some(elapsed) = self.elapsed(now) else {
            tracing::debug!(kind = %self.kind, "input ignored: window closed");
            return None;
        };
        if self.consumed {
            tracing::debug!(kind = %self.kind, "input ignored: window already consumed");
            return None;
        }

        self.consumed = true;
        let outcome = self.config.classify(elapsed);
        tracing::debug!(kind = %self.kind, elapsed = %elapsed, ?outcome, "window input classified");
        self.finish(outcome);
        Some(outcome)
    }

    /// Force-closes without classification. Emits `Closed { success: false }` only.
    pub fn cancel(&mut self) -> bool {
        if self.opened_at.take().is_none() {
            return false;
        }

        self.consumed = false;
        tracing::trace!(kind = %self.kind, "window cancelled");
        self.events.emit(&WindowEvent::Closed {
            kind: self.kind,
            success: false,
        });
        true
    }

    pub fn subscribe(&self, callback: impl FnMut(&WindowEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub fn on_event(&self) -> &Signal<WindowEvent> {
        &self.events
    }

    fn finish(&mut self, outcome: WindowOutcome) {
        self.opened_at = None;
        self.last_outcome = Some(outcome);

        let event = match outcome {
            WindowOutcome::Success { perfect } => WindowEvent::Succeeded {
                kind: self.kind,
                perfect,
            },
            WindowOutcome::Fail { reason } => WindowEvent::Failed {
                kind: self.kind,
                reason,
            },
        };
        self.events.emit(&event);
        self.events.emit(&WindowEvent::Closed {
            kind: self.kind,
            success: outcome.is_success(),
        });
    }
}
