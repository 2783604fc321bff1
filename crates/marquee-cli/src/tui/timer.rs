//! Cancellable one-shot timers driven by the event loop tick.

use std::time::{Duration, Instant};

/// One-shot deadline carrying a payload.
///
/// Scheduling again replaces the pending deadline, so a replaced deadline
/// can never fire.
#[derive(Debug)]
pub struct Deadline<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for Deadline<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Deadline<T> {
    /// Schedules `payload` to fire at `at`, replacing any pending deadline.
    pub fn schedule(&mut self, at: Instant, payload: T) {
        self.pending = Some((at, payload));
    }

    /// Cancels the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the payload if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if *at <= now => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}

/// Keeps only the last value pushed within a quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    deadline: Deadline<T>,
}

impl<T> Debouncer<T> {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: Deadline::default(),
        }
    }

    /// Records a new value, restarting the quiet period.
    pub fn push(&mut self, now: Instant, value: T) {
        let at = now.checked_add(self.delay).unwrap_or(now);
        self.deadline.schedule(at, value);
    }

    /// Returns the last value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        self.deadline.fire(now)
    }

    /// Whether a value is waiting for its quiet period to end.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_pending()
    }
}
