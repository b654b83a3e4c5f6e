//! Single-slot scheduler for delayed transitions.
//!
//! Time is an explicit engine clock (a `Duration` since the engine was
//! created) that only moves when the owner calls [`Scheduler::fire_due`] or
//! [`Scheduler::advance_to`]. At most one transition is armed at a time:
//! arming a new one replaces whatever was pending, so a cancelled transition
//! can never fire late.

use std::time::Duration;

/// Work the engine schedules for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// One step of the per-entry countdown.
    Tick,
    /// Move to the next entry (or complete).
    Advance,
    /// Unlock the same entry for another attempt.
    Rearm,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    deadline: Duration,
    transition: Transition,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    armed: Option<Armed>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arms `transition` to fire `delay` from now, replacing whatever was pending.
    pub fn arm(&mut self, delay: Duration, transition: Transition) {
        self.armed = Some(Armed {
            deadline: self.now + delay,
            transition,
        });
    }

    /// Drops the pending transition, returning it.
    pub fn cancel(&mut self) -> Option<Transition> {
        self.armed.take().map(|a| a.transition)
    }

    pub fn pending(&self) -> Option<Transition> {
        self.armed.map(|a| a.transition)
    }

    /// Pops the armed transition if its deadline is at or before `until`,
    /// moving the clock to that deadline.
    pub fn fire_due(&mut self, until: Duration) -> Option<Transition> {
        match self.armed {
            Some(armed) if armed.deadline <= until => {
                self.armed = None;
                self.now = self.now.max(armed.deadline);
                Some(armed.transition)
            }
            _ => None,
        }
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
