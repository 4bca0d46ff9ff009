//! Sources of player input for the frame loop.
//!
//! Runtime users plug in [`InputProvider`] implementations so an encounter
//! can be driven by a device, a UI, or a scripted fixture. Every press a
//! provider produces is routed through the battle's input gate; providers
//! never mutate the battle directly.
use std::collections::VecDeque;

use battle_core::{ActionKind, Battle, InputPermission, Millis, WindowKind};

/// A raw press, already debounced to "pressed this frame".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press {
    Action(ActionKind),
    Parry,
    Qte,
}

/// Trait for providing player presses based on the current battle.
pub trait InputProvider {
    /// Next press to submit at the battle's current time, if any.
    ///
    /// Called repeatedly within a frame until it returns `None`.
    fn poll(&mut self, battle: &Battle) -> Option<Press>;

    /// Battle time at which this provider next wants to be polled.
    ///
    /// The frame loop shortens the next step so the poll lands exactly there.
    fn wake_at(&self, _battle: &Battle) -> Option<Millis> {
        None
    }
}

/// One step of a scripted encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedInput {
    /// Request an action as soon as the player may act.
    Action(ActionKind),
    /// Press `at` after the next parry window opens.
    Parry { at: Millis },
    /// Press `at` after the next QTE window opens.
    Qte { at: Millis },
    /// Let the next parry window time out.
    SkipParry,
    /// Let the next QTE window time out.
    SkipQte,
}

impl PlannedInput {
    fn window(&self) -> Option<(WindowKind, Option<Millis>)> {
        match *self {
            PlannedInput::Action(_) => None,
            PlannedInput::Parry { at } => Some((WindowKind::Parry, Some(at))),
            PlannedInput::Qte { at } => Some((WindowKind::Qte, Some(at))),
            PlannedInput::SkipParry => Some((WindowKind::Parry, None)),
            PlannedInput::SkipQte => Some((WindowKind::Qte, None)),
        }
    }
}

/// Replays a fixed plan against live battle state.
///
/// Once the plan is exhausted the provider ends every player turn and never
/// parries, so an encounter always runs to completion.
#[derive(Clone, Debug, Default)]
pub struct ScriptedProvider {
    plan: VecDeque<PlannedInput>,
    /// Opening time of the last window handled per kind (parry, qte).
    handled: [Option<Millis>; 2],
}

impl ScriptedProvider {
    pub fn new(plan: impl IntoIterator<Item = PlannedInput>) -> Self {
        Self {
            plan: plan.into_iter().collect(),
            handled: [None; 2],
        }
    }

    /// Provider that only ever ends its turn.
    pub fn passive() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> usize {
        self.plan.len()
    }

    fn slot(kind: WindowKind) -> usize {
        match kind {
            WindowKind::Parry => 0,
            WindowKind::Qte => 1,
        }
    }

    /// Opening time of the window the head of the plan is waiting for.
    fn fresh_window(&self, battle: &Battle, kind: WindowKind) -> Option<Millis> {
        let opened_at = battle.window(kind).opened_at()?;
        (self.handled[Self::slot(kind)] != Some(opened_at)).then_some(opened_at)
    }
}

impl InputProvider for ScriptedProvider {
    fn poll(&mut self, battle: &Battle) -> Option<Press> {
        loop {
            let Some(next) = self.plan.front().copied() else {
                let idle = battle.permission() == InputPermission::PlayerTurn;
                return idle.then_some(Press::Action(ActionKind::EndTurn));
            };

            if let PlannedInput::Action(kind) = next {
                if battle.permission() != InputPermission::PlayerTurn {
                    return None;
                }
                self.plan.pop_front();
                return Some(Press::Action(kind));
            }

            let (kind, offset) = next.window()?;
            let opened_at = self.fresh_window(battle, kind)?;
            match offset {
                None => {
                    tracing::debug!(%kind, "scripted skip");
                    self.handled[Self::slot(kind)] = Some(opened_at);
                    self.plan.pop_front();
                }
                Some(offset) if battle.now() >= opened_at + offset => {
                    self.handled[Self::slot(kind)] = Some(opened_at);
                    self.plan.pop_front();
                    return Some(match kind {
                        WindowKind::Parry => Press::Parry,
                        WindowKind::Qte => Press::Qte,
                    });
                }
                Some(_) => return None,
            }
        }
    }

    fn wake_at(&self, battle: &Battle) -> Option<Millis> {
        let (kind, offset) = self.plan.front()?.window()?;
        let opened_at = self.fresh_window(battle, kind)?;
        offset.map(|offset| opened_at + offset)
    }
}
