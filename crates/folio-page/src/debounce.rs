//! Search input debouncing.

use std::time::Duration;

use tokio::time::Instant;

/// Debouncer driven by explicit timestamps.
///
/// Each input restarts the quiet period; [`poll`](Self::poll) yields the latest term
/// once the input has been quiet for the delay.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an input at `now`.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some((term.into(), now));
    }

    /// The term waiting to settle, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|(term, _)| term.as_str())
    }

    /// When the pending term settles.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending term if it has settled by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(term, _)| term),
            _ => None,
        }
    }

    /// Take the pending term immediately (Enter key, search button).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(term, _)| term)
    }
}
