//! Debounce timer and clock abstraction.
//!
//! The pipeline is single-threaded and event driven, so the timer is a
//! deadline that the owner polls from its event loop rather than a spawned
//! task. Time comes from a [`Clock`] so tests can drive it by hand.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and replay.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    /// A clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Delays a value until pushes have been quiet for `delay`.
///
/// Each [`push`](Self::push) cancels the previous pending value and restarts
/// the timer. A zero delay fires immediately.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabula::{Clock, Debouncer, ManualClock};
///
/// let clock = ManualClock::new();
/// let mut debouncer = Debouncer::new(Duration::from_millis(300));
///
/// assert_eq!(debouncer.push("a", clock.now()), None);
/// clock.advance(Duration::from_millis(100));
/// assert_eq!(debouncer.push("ab", clock.now()), None);
/// clock.advance(Duration::from_millis(299));
/// assert_eq!(debouncer.poll(clock.now()), None);
/// clock.advance(Duration::from_millis(1));
/// assert_eq!(debouncer.poll(clock.now()), Some("ab"));
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period. A pending value keeps its old deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `value`, cancelling whatever was pending.
    ///
    /// Returns the value straight back when the delay is zero.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        if self.delay.is_zero() {
            self.pending = None;
            return Some(value);
        }
        if self.pending.is_some() {
            log::trace!("Debounce restarted, previous value cancelled");
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
        None
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Returns `true` while a value is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending value, for scheduling a wakeup.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if self.cancel().is_some() {
            log::trace!("Debouncer dropped with a pending value");
        }
    }
}
