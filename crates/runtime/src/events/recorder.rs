use std::cell::{Cell, RefCell};
use std::rc::Rc;

use battle_core::{Battle, BattleEvent, Millis, Subscription};
use serde::{Deserialize, Serialize};

/// A battle notification with the battle time it was observed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub at: Millis,
    pub event: BattleEvent,
}

/// Collects every [`BattleEvent`] of one battle while it is alive.
///
/// The subscription is released when the recorder is dropped.
#[derive(Debug)]
pub struct EventRecorder {
    clock: Rc<Cell<Millis>>,
    events: Rc<RefCell<Vec<RecordedEvent>>>,
    _subscription: Subscription,
}

impl EventRecorder {
    pub fn attach(battle: &Battle) -> Self {
        let clock = Rc::new(Cell::new(battle.now()));
        let events = Rc::new(RefCell::new(Vec::new()));

        let subscription = {
            let clock = Rc::clone(&clock);
            let events = Rc::clone(&events);
            battle.subscribe(move |event| {
                events.borrow_mut().push(RecordedEvent {
                    at: clock.get(),
                    event: *event,
                });
            })
        };

        Self {
            clock,
            events,
            _subscription: subscription,
        }
    }

    /// Sets the time stamped on events recorded from now on.
    pub fn stamp(&self, now: Millis) {
        self.clock.set(now);
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn count(&self, pred: impl Fn(&BattleEvent) -> bool) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|recorded| pred(&recorded.event))
            .count()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Takes the recorded events, leaving the recorder empty.
    pub fn drain(&self) -> Vec<RecordedEvent> {
        self.events.take()
    }
}
