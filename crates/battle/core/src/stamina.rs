//! Per-combatant stamina pool.
//!
//! Stamina gates which actions a combatant may perform. It is restored to
//! maximum at the start of the owner's turn, spent by actions and topped up by
//! rewards (e.g. a successful parry).
//!
//! Invariant: `0 <= current <= max` after every operation. Insufficient
//! stamina is not an error: [`StaminaResource::consume`] reports it through
//! its return value and leaves the pool untouched.

use crate::notify::{Signal, Subscription};

/// Notification carried by every successful stamina mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaminaChanged {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug)]
pub struct StaminaResource {
    current: u32,
    max: u32,
    changed: Signal<StaminaChanged>,
}

impl StaminaResource {
    /// Creates a full pool with the given maximum.
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            changed: Signal::new(),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    pub fn has_enough(&self, cost: u32) -> bool {
        self.current >= cost
    }

    pub fn restore_to_max(&mut self) {
        self.current = self.max;
        self.notify();
    }

    /// Spends `amount` if available. All-or-nothing: on `false` the pool is unchanged.
    pub fn consume(&mut self, amount: u32) -> bool {
        if !self.has_enough(amount) {
            tracing::debug!(
                current = self.current,
                requested = amount,
                "stamina consume rejected"
            );
            return false;
        }

        self.current -= amount;
        self.notify();
        true
    }

    /// Adds `amount`, clamped to the maximum. Returns the amount actually gained.
    pub fn add(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.notify();
        self.current - before
    }

    /// Changes the maximum, clamping the current value down when needed.
    pub fn set_max(&mut self, new_max: u32) {
        self.max = new_max;
        self.current = self.current.min(new_max);
        self.notify();
    }

    /// Subscribes to `(current, max)` change notifications.
    pub fn subscribe(&self, callback: impl FnMut(&StaminaChanged) + 'static) -> Subscription {
        self.changed.subscribe(callback)
    }

    pub fn on_changed(&self) -> &Signal<StaminaChanged> {
        &self.changed
    }

    fn notify(&self) {
        self.changed.emit(&StaminaChanged {
            current: self.current,
            max: self.max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn consume_is_all_or_nothing() {
        let mut stamina = StaminaResource::new(100);

        assert!(stamina.consume(30));
        assert_eq!(stamina.current(), 70);

        assert!(stamina.consume(30));
        assert!(stamina.consume(30));
        assert_eq!(stamina.current(), 10);

        // Not enough for another one
        assert!(!stamina.consume(30));
        assert_eq!(stamina.current(), 10);
    }

    #[test]
    fn conservation_holds_for_every_amount() {
        for start in [0u32, 1, 25, 99, 100] {
            for amount in 0..=120u32 {
                let mut stamina = StaminaResource::new(100);
                stamina.consume(100 - start);
                assert_eq!(stamina.current(), start);

                let accepted = stamina.consume(amount);
                if accepted {
                    assert_eq!(stamina.current(), start - amount);
                } else {
                    assert!(amount > start);
                    assert_eq!(stamina.current(), start);
                }
            }
        }
    }

    #[test]
    fn stays_within_bounds_across_mixed_operations() {
        let mut stamina = StaminaResource::new(50);
        let script: [(u8, u32); 12] = [
            (0, 20),
            (1, 100),
            (0, 60),
            (2, 0),
            (3, 10),
            (1, 5),
            (0, 11),
            (3, 80),
            (1, 200),
            (0, 79),
            (2, 0),
            (3, 0),
        ];

        for (op, amount) in script {
            match op {
                0 => {
                    stamina.consume(amount);
                }
                1 => {
                    stamina.add(amount);
                }
                2 => stamina.restore_to_max(),
                _ => stamina.set_max(amount),
            }
            assert!(stamina.current() <= stamina.max());
        }
        assert_eq!(stamina.max(), 0);
        assert_eq!(stamina.current(), 0);
    }

    #[test]
    fn add_is_clamped_and_reports_gain() {
        let mut stamina = StaminaResource::new(100);
        stamina.consume(20);

        assert_eq!(stamina.add(30), 20);
        assert!(stamina.is_full());
    }

    #[test]
    fn set_max_clamps_current_down() {
        let mut stamina = StaminaResource::new(100);
        stamina.set_max(40);
        assert_eq!(stamina.current(), 40);

        stamina.set_max(80);
        assert_eq!(stamina.current(), 40);
        stamina.restore_to_max();
        assert_eq!(stamina.current(), 80);
    }

    #[test]
    fn successful_mutations_notify_and_rejections_do_not() {
        let mut stamina = StaminaResource::new(100);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            stamina.subscribe(move |change| seen.borrow_mut().push(*change))
        };

        stamina.consume(60);
        stamina.consume(60);
        stamina.add(10);

        assert_eq!(
            *seen.borrow(),
            vec![
                StaminaChanged { current: 40, max: 100 },
                StaminaChanged { current: 50, max: 100 },
            ]
        );
    }
}
