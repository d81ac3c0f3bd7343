//! Single-slot timers driven by the event loop's clock.
//!
//! Nothing here sleeps or spawns: callers pass `now` in and poll. Scheduling a
//! new deadline replaces the old one, so an owner never has two timers pending.

use std::time::{Duration, Instant};

/// Quiet period before a typed search term is used for a query.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// A timer owning at most one pending deadline.
#[derive(Clone, Debug, Default)]
pub struct ScopedTimer {
    deadline: Option<Instant>,
}

impl ScopedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer for `now + delay`, discarding any earlier deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A value whose settled copy only follows the raw one after a quiet period.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    raw: T,
    settled: T,
    delay: Duration,
    timer: ScopedTimer,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            raw: initial.clone(),
            settled: initial,
            delay,
            timer: ScopedTimer::new(),
        }
    }

    pub fn raw(&self) -> &T {
        &self.raw
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// Replace the raw value and restart the quiet period.
    pub fn set(&mut self, value: T, now: Instant) {
        self.raw = value;
        self.timer.schedule(now, self.delay);
    }

    /// Edit the raw value in place and restart the quiet period.
    pub fn update(&mut self, now: Instant, f: impl FnOnce(&mut T)) {
        f(&mut self.raw);
        self.timer.schedule(now, self.delay);
    }

    /// Returns the new settled value when the quiet period has elapsed and
    /// the value differs from the previous settled one.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        if !self.timer.fire(now) || self.raw == self.settled {
            return None;
        }
        self.settled = self.raw.clone();
        Some(&self.settled)
    }
}
