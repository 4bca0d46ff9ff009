//! Centralized input gating.
//!
//! [`InputGate`] is the only place where a raw press becomes a semantic
//! request. Every input source (devices, UI buttons, scripted harnesses) goes
//! through it, so a press racing a state transition cannot slip past the
//! permission check.
//!
//! Rejections are ordinary control flow: they are returned as
//! [`InputVerdict::Rejected`] with a diagnostic [`RejectReason`] and logged at
//! debug level. Nothing here returns an error.

use core::fmt;

use crate::action::ActionKind;
use crate::notify::{Signal, Subscription};
use crate::time::Millis;
use crate::window::{TimingWindow, WindowKind, WindowOutcome};

/// Category of input the battle currently accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum InputPermission {
    #[default]
    Disabled,
    PlayerTurn,
    ParryWindow,
    QteWindow,
    ExecutingAction,
}

impl InputPermission {
    /// Permission that coincides with an open window of `kind`.
    pub const fn for_window(kind: WindowKind) -> Self {
        match kind {
            WindowKind::Parry => InputPermission::ParryWindow,
            WindowKind::Qte => InputPermission::QteWindow,
        }
    }
}

/// Why the gate refused a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RejectReason {
    /// Action requested while the permission does not allow it.
    NotPlayerTurn { permission: InputPermission },
    /// Timed press while the matching window is not active.
    WindowInactive { kind: WindowKind },
    /// Window flag set but permission points elsewhere.
    PermissionMismatch {
        kind: WindowKind,
        permission: InputPermission,
    },
    /// The window had already accepted its single input.
    WindowConsumed { kind: WindowKind },
}

impl RejectReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotPlayerTurn { .. } => "not_player_turn",
            RejectReason::WindowInactive { .. } => "window_inactive",
            RejectReason::PermissionMismatch { .. } => "permission_mismatch",
            RejectReason::WindowConsumed { .. } => "window_consumed",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotPlayerTurn { permission } => {
                write!(f, "actions are not accepted while permission is {permission}")
            }
            RejectReason::WindowInactive { kind } => write!(f, "{kind} window is not active"),
            RejectReason::PermissionMismatch { kind, permission } => {
                write!(f, "{kind} window is active but permission is {permission}")
            }
            RejectReason::WindowConsumed { kind } => {
                write!(f, "{kind} window already accepted an input")
            }
        }
    }
}

/// Result of an action request.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputVerdict {
    Accepted,
    Rejected(RejectReason),
}

impl InputVerdict {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, InputVerdict::Accepted)
    }
}

/// Result of a timed (parry/QTE) press.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    Resolved(WindowOutcome),
    Rejected(RejectReason),
}

/// Gate notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum GateEvent {
    PermissionChanged {
        from: InputPermission,
        to: InputPermission,
    },
    ActionRequested {
        kind: ActionKind,
    },
}

#[derive(Debug, Default)]
pub struct InputGate {
    permission: InputPermission,
    parry_active: bool,
    qte_active: bool,
    queue_during_action: bool,
    /// Permission in force when the most recent window opened.
    before_window: Option<InputPermission>,
    last_rejection: Option<RejectReason>,
    events: Signal<GateEvent>,
}

impl InputGate {
    pub fn new(queue_during_action: bool) -> Self {
        Self {
            queue_during_action,
            ..Self::default()
        }
    }

    pub fn permission(&self) -> InputPermission {
        self.permission
    }

    pub fn is_parry_window_active(&self) -> bool {
        self.parry_active
    }

    pub fn is_qte_window_active(&self) -> bool {
        self.qte_active
    }

    pub fn queues_during_action(&self) -> bool {
        self.queue_during_action
    }

    /// Most recent rejection, kept for diagnostics.
    pub fn last_rejection(&self) -> Option<RejectReason> {
        self.last_rejection
    }

    /// Permission that was active right before the latest window opened.
    pub fn permission_before_window(&self) -> Option<InputPermission> {
        self.before_window
    }

    /// Sets the permission. No-op if unchanged; returns true on change.
    pub fn set_permission(&mut self, permission: InputPermission) -> bool {
        let from = self.permission;
        if from == permission {
            return false;
        }

        self.permission = permission;
        tracing::debug!(%from, to = %permission, "input permission changed");
        self.events.emit(&GateEvent::PermissionChanged {
            from,
            to: permission,
        });
        true
    }

    /// Mirrors the parry window's open state. Activation forces
    /// `ParryWindow` permission; deactivation leaves permission alone.
    pub fn set_parry_window_active(&mut self, active: bool) {
        self.set_window_active(WindowKind::Parry, active);
    }

    /// Mirrors the QTE window's open state. Activation forces `QteWindow`
    /// permission; deactivation leaves permission alone.
    pub fn set_qte_window_active(&mut self, active: bool) {
        self.set_window_active(WindowKind::Qte, active);
    }

    pub fn is_window_active(&self, kind: WindowKind) -> bool {
        match kind {
            WindowKind::Parry => self.parry_active,
            WindowKind::Qte => self.qte_active,
        }
    }

    /// Validates a semantic action request and announces it on acceptance.
    pub fn request_action(&mut self, kind: ActionKind) -> InputVerdict {
        let allowed = match self.permission {
            InputPermission::PlayerTurn => true,
            InputPermission::ExecutingAction => self.queue_during_action,
            _ => false,
        };

        if !allowed {
            let reason = self.reject(RejectReason::NotPlayerTurn {
                permission: self.permission,
            });
            return InputVerdict::Rejected(reason);
        }

        self.events.emit(&GateEvent::ActionRequested { kind });
        InputVerdict::Accepted
    }

    /// Forwards a parry press to `window` if the parry window is active.
    pub fn request_parry(&mut self, window: &mut TimingWindow, now: Millis) -> PressOutcome {
        self.request_timed(WindowKind::Parry, window, now)
    }

    /// Forwards a QTE press to `window` if the QTE window is active.
    pub fn request_qte(&mut self, window: &mut TimingWindow, now: Millis) -> PressOutcome {
        self.request_timed(WindowKind::Qte, window, now)
    }

    /// Back to `Disabled` with both window flags cleared.
    pub fn reset(&mut self) {
        self.parry_active = false;
        self.qte_active = false;
        self.before_window = None;
        self.last_rejection = None;
        self.set_permission(InputPermission::Disabled);
    }

    pub fn subscribe(&self, callback: impl FnMut(&GateEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub fn on_event(&self) -> &Signal<GateEvent> {
        &self.events
    }

    fn set_window_active(&mut self, kind: WindowKind, active: bool) {
        let (flag, other) = match kind {
            WindowKind::Parry => (&mut self.parry_active, self.qte_active),
            WindowKind::Qte => (&mut self.qte_active, self.parry_active),
        };

        if active && other {
            tracing::warn!(%kind, "window activated while the other window is active");
        }
        *flag = active;

        if active {
            if self.permission != InputPermission::for_window(kind) {
                self.before_window = Some(self.permission);
            }
            self.set_permission(InputPermission::for_window(kind));
        }
    }

    fn request_timed(
        &mut self,
        kind: WindowKind,
        window: &mut TimingWindow,
        now: Millis,
    ) -> PressOutcome {
        debug_assert_eq!(window.kind(), kind, "timed press routed to the wrong window");

        if !self.is_window_active(kind) {
            return PressOutcome::Rejected(self.reject(RejectReason::WindowInactive { kind }));
        }
        if self.permission != InputPermission::for_window(kind) {
            let reason = self.reject(RejectReason::PermissionMismatch {
                kind,
                permission: self.permission,
            });
            return PressOutcome::Rejected(reason);
        }

        match window.submit_input(now) {
            Some(outcome) => PressOutcome::Resolved(outcome),
            None => {
                tracing::warn!(%kind, "gate flag active but window not accepting input");
                PressOutcome::Rejected(self.reject(RejectReason::WindowConsumed { kind }))
            }
        }
    }

    /// Logs and records `reason`, handing it back for the caller to wrap.
    fn reject(&mut self, reason: RejectReason) -> RejectReason {
        tracing::debug!(reason = reason.as_str(), "input rejected: {reason}");
        self.last_rejection = Some(reason);
        reason
    }
}
