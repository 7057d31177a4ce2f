//! Single-slot phase timer for Invaders rooms.
//!
//! A room is always waiting on at most one thing: the end of the current
//! phase. [`PhaseTimer`] holds that one pending event together with its
//! deadline. Scheduling a new event replaces the old one, so a phase
//! transition can never leave a stale timer behind.
//!
//! # Integration
//!
//! The timer is designed to sit inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         event = timer.fired() => {
//!             let next = engine.advance(event);
//!             timer.schedule(next.event, next.after);
//!         }
//!     }
//! }
//! ```
//!
//! When nothing is scheduled, [`PhaseTimer::fired`] pends forever and the
//! `select!` keeps serving commands.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::trace;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters for one timer's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Events handed to [`PhaseTimer::schedule`].
    pub scheduled: u64,
    /// Events that reached their deadline and were returned by `fired`.
    pub fired: u64,
    /// Events dropped before their deadline, by `cancel` or by being
    /// replaced.
    pub superseded: u64,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Holds at most one pending event and fires it at its deadline.
///
/// `T` is whatever the owner wants back when the deadline passes; rooms
/// use the phase transition that is due.
#[derive(Debug)]
pub struct PhaseTimer<T> {
    slot: Option<(Instant, T)>,
    stats: TimerStats,
}

impl<T> Default for PhaseTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PhaseTimer<T> {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self {
            slot: None,
            stats: TimerStats::default(),
        }
    }

    /// Arrange for `event` to fire `after` from now.
    ///
    /// Any event already pending is discarded. Returns the discarded event.
    pub fn schedule(&mut self, event: T, after: Duration) -> Option<T> {
        let deadline = Instant::now() + after;
        let previous = self.slot.replace((deadline, event)).map(|(_, e)| e);
        self.stats.scheduled += 1;
        if previous.is_some() {
            self.stats.superseded += 1;
        }
        trace!(?after, "phase timer scheduled");
        previous
    }

    /// Drop the pending event, if any, and return it.
    pub fn cancel(&mut self) -> Option<T> {
        let previous = self.slot.take().map(|(_, e)| e);
        if previous.is_some() {
            self.stats.superseded += 1;
            trace!("phase timer cancelled");
        }
        previous
    }

    /// Whether an event is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// The pending event, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, e)| e)
    }

    /// Time left until the pending event fires. `None` when idle;
    /// `Some(Duration::ZERO)` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn stats(&self) -> TimerStats {
        self.stats
    }

    /// Wait for the pending event's deadline and take the event.
    ///
    /// Pends forever when nothing is scheduled. Cancel-safe: the event is
    /// only removed after the deadline has passed, so dropping this future
    /// (e.g. because another `select!` branch won) loses nothing.
    pub async fn fired(&mut self) -> T {
        let Some(deadline) = self.slot.as_ref().map(|(deadline, _)| *deadline) else {
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        match self.slot.take() {
            Some((_, event)) => {
                self.stats.fired += 1;
                trace!("phase timer fired");
                event
            }
            None => std::future::pending().await,
        }
    }
}
