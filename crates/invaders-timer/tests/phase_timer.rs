//! Integration tests for the single-slot phase timer.
//!
//! Every async test runs with a paused clock. Tokio auto-advances paused
//! time whenever the runtime is idle, so sleeps resolve instantly and the
//! elapsed virtual time can be asserted exactly.

use std::time::Duration;

use invaders_timer::{PhaseTimer, TimerStats};
use tokio::time::{Instant, timeout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    Night,
    Day,
    Voting,
}

// =========================================================================
// Idle timer
// =========================================================================

#[test]
fn test_new_timer_is_idle() {
    let timer: PhaseTimer<Due> = PhaseTimer::new();
    assert!(!timer.is_pending());
    assert_eq!(timer.remaining(), None);
    assert_eq!(timer.peek(), None);
    assert_eq!(timer.stats(), TimerStats::default());
}

#[tokio::test(start_paused = true)]
async fn test_idle_timer_never_fires() {
    let mut timer: PhaseTimer<Due> = PhaseTimer::new();
    let result = timeout(Duration::from_secs(3600), timer.fired()).await;
    assert!(result.is_err(), "idle timer must pend forever");
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_fires_at_deadline() {
    let mut timer = PhaseTimer::new();
    let start = Instant::now();
    timer.schedule(Due::Night, Duration::from_secs(5));

    let event = timer.fired().await;

    assert_eq!(event, Due::Night);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(!timer.is_pending());
    assert_eq!(timer.stats().fired, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fires_once() {
    let mut timer = PhaseTimer::new();
    timer.schedule(Due::Day, Duration::from_secs(1));
    assert_eq!(timer.fired().await, Due::Day);

    let again = timeout(Duration::from_secs(60), timer.fired()).await;
    assert!(again.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let mut timer = PhaseTimer::new();
    timer.schedule(Due::Voting, Duration::from_secs(60));
    tokio::time::advance(Duration::from_secs(20)).await;
    assert_eq!(timer.remaining(), Some(Duration::from_secs(40)));

    tokio::time::advance(Duration::from_secs(100)).await;
    assert_eq!(timer.remaining(), Some(Duration::ZERO));
    assert_eq!(timer.fired().await, Due::Voting);
}

// =========================================================================
// Replacement and cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_schedule_replaces_pending_event() {
    let mut timer = PhaseTimer::new();
    let start = Instant::now();
    assert_eq!(timer.schedule(Due::Night, Duration::from_secs(40)), None);
    assert_eq!(
        timer.schedule(Due::Day, Duration::from_secs(90)),
        Some(Due::Night)
    );

    assert_eq!(timer.fired().await, Due::Day);
    assert_eq!(start.elapsed(), Duration::from_secs(90));

    let stats = timer.stats();
    assert_eq!(stats.scheduled, 2);
    assert_eq!(stats.superseded, 1);
    assert_eq!(stats.fired, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_pending_event() {
    let mut timer = PhaseTimer::new();
    timer.schedule(Due::Night, Duration::from_secs(1));
    assert_eq!(timer.cancel(), Some(Due::Night));
    assert_eq!(timer.cancel(), None);

    let result = timeout(Duration::from_secs(10), timer.fired()).await;
    assert!(result.is_err());
    assert_eq!(timer.stats().superseded, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_wait_keeps_event() {
    // Losing a select! race must not consume the event.
    let mut timer = PhaseTimer::new();
    timer.schedule(Due::Voting, Duration::from_secs(10));

    tokio::select! {
        _ = timer.fired() => panic!("timer should lose the race"),
        _ = tokio::time::sleep(Duration::from_secs(3)) => {}
    }

    assert_eq!(timer.peek(), Some(&Due::Voting));
    assert_eq!(timer.remaining(), Some(Duration::from_secs(7)));
    assert_eq!(timer.fired().await, Due::Voting);
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_fires_immediately() {
    let mut timer = PhaseTimer::new();
    let start = Instant::now();
    timer.schedule(Due::Night, Duration::ZERO);
    assert_eq!(timer.fired().await, Due::Night);
    assert_eq!(start.elapsed(), Duration::ZERO);
}
