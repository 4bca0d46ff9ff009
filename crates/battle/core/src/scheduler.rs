//! Tick-driven queue of delayed continuations.
//!
//! Resumable waits ("wait 500ms, apply counter damage, wait 500ms, end turn")
//! are modelled as tasks due at a point on the battle clock. The host's tick
//! drains due tasks in due-time order; tasks due at the same time run in the
//! order they were scheduled.
//!
//! Each task remembers the generation it was scheduled in.
//! [`Scheduler::cancel_all`] starts a new generation, so a continuation
//! scheduled before a teardown can never fire after it.

use crate::time::Millis;

/// Handle for a single scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// A task whose due time has been reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Due<T> {
    pub id: TaskId,
    pub at: Millis,
    pub task: T,
}

#[derive(Debug)]
struct Scheduled<T> {
    id: TaskId,
    at: Millis,
    generation: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    queue: Vec<Scheduled<T>>,
    next_id: u64,
    generation: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            next_id: 0,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live (current-generation) tasks.
    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live().next().is_none()
    }

    /// Schedules `task` to run at `at`.
    pub fn schedule_at(&mut self, at: Millis, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let generation = self.generation;
        self.queue
            .retain(|scheduled| scheduled.generation == generation);
        self.queue.push(Scheduled {
            id,
            at,
            generation: self.generation,
            task,
        });
        id
    }

    /// Schedules `task` to run `delay` after `from`.
    pub fn schedule_after(&mut self, from: Millis, delay: Millis, task: T) -> TaskId {
        self.schedule_at(from + delay, task)
    }

    /// Invalidates every pending task. Stale entries are purged by the next
    /// `schedule_at`, or skipped by `pop_due` if nothing is scheduled first.
    pub fn cancel_all(&mut self) {
        let pending = self.len();
        if pending > 0 {
            tracing::trace!(pending, "cancelling scheduled tasks");
        }
        self.generation += 1;
    }

    /// Earliest due time among live tasks.
    pub fn next_due(&self) -> Option<Millis> {
        self.live().map(|scheduled| scheduled.at).min()
    }

    fn live(&self) -> impl Iterator<Item = &Scheduled<T>> {
        self.queue
            .iter()
            .filter(|scheduled| scheduled.generation == self.generation)
    }

    /// Removes and returns the earliest task due at or before `now`.
    ///
    /// Call repeatedly until `None`; tasks scheduled by a handler with a due
    /// time `<= now` are returned within the same drain.
    pub fn pop_due(&mut self, now: Millis) -> Option<Due<T>> {
        loop {
            let index = self
                .queue
                .iter()
                .enumerate()
                .filter(|(_, scheduled)| scheduled.at <= now)
                .min_by_key(|(_, scheduled)| (scheduled.at, scheduled.id))
                .map(|(index, _)| index)?;

            let scheduled = self.queue.remove(index);
            if scheduled.generation != self.generation {
                tracing::trace!(id = scheduled.id.0, "stale continuation discarded");
                continue;
            }

            return Some(Due {
                id: scheduled.id,
                at: scheduled.at,
                task: scheduled.task,
            });
        }
    }
}
