//! Observer registry with scoped subscription handles.
//!
//! Every emitting component owns one [`Signal`] per notification type.
//! Subscribers receive a [`Subscription`] handle; dropping the handle
//! unsubscribes, and dropping the emitter invalidates every outstanding handle.
//!
//! Delivery is synchronous and follows subscription order. Callbacks may
//! subscribe or unsubscribe while an emission is in flight: a subscriber
//! removed mid-emission is not called for the remainder of that emission, and
//! a subscriber added mid-emission first hears the next one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slot<T> {
    id: u64,
    callback: Callback<T>,
}

struct Registry<T> {
    next_id: u64,
    slots: Vec<Slot<T>>,
}

impl<T> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }
}

/// Type-erased view of a registry used by [`Subscription`] handles.
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn is_attached(&self, id: u64) -> bool;
}

impl<T> Detach for RefCell<Registry<T>> {
    fn detach(&self, id: u64) -> bool {
        let mut registry = self.borrow_mut();
        let before = registry.slots.len();
        registry.slots.retain(|slot| slot.id != id);
        registry.slots.len() != before
    }

    fn is_attached(&self, id: u64) -> bool {
        self.borrow().contains(id)
    }
}

/// Multicast notification registry owned by an emitting component.
pub struct Signal<T: 'static> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Registers `callback` and returns the handle that keeps it registered.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(RefCell::new(callback));

        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.slots.push(Slot { id, callback });
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        let registry: Weak<dyn Detach> = weak;

        Subscription { registry, id }
    }

    /// Delivers `event` to every current subscriber in subscription order.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn emit(&self, event: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .registry
            .borrow()
            .slots
            .iter()
            .map(|slot| (slot.id, Rc::clone(&slot.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }

            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    (&mut *callback)(event);
                    delivered += 1;
                }
                Err(_) => {
                    tracing::warn!(subscriber = id, "re-entrant emission skipped");
                }
            }
        }

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().slots.len()
    }

    /// Drops every registered callback. Outstanding handles become inert.
    pub fn clear(&self) {
        self.registry.borrow_mut().slots.clear();
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Scoped handle for a [`Signal`] subscription.
///
/// The callback stays registered for as long as the handle is alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    /// Returns true while the emitter is alive and the callback registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.is_attached(self.id))
    }

    /// Unsubscribes explicitly. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
