//! Caller-side hedging policy: primary fetch, deadline-gated fallback,
//! then winner and completion waits.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::HedgeConfig;
use crate::errors::HedgeError;
use crate::metrics_defs::{
    DONE_DEADLINE_MISSES, FALLBACK_STARTED, WINNER_DEADLINE_MISSES, WINNER_LATENCY,
};
use crate::race::FetchRace;
use crate::sink::FetchSink;

/// Starts one fetch attempt against the given sink.
///
/// `start` must not block: implementations hand the sink to whatever does
/// the actual work (a worker thread, a connection pool) and return.
/// There is no way to cancel the work afterwards; a losing
/// attempt runs to completion with its output discarded.
pub trait Fetcher: Send + Sync {
    fn start(&self, sink: Arc<dyn FetchSink>);
}

/// Runs a hedged fetch toward `target`.
///
/// The primary fetcher starts immediately. If it has not produced output
/// within `fallback_after_ms`, the fallback fetcher (when given) is
/// started against a second racer. Whichever attempt produces output
/// first feeds the target; the driver then waits for that winner to
/// finish.
///
/// `Ok(())` means the winner ran to completion in time; whether the fetch
/// itself succeeded is whatever the winner passed to the target's `done`.
/// Deadline misses never cancel the underlying work; racers that are
/// still in flight detach when the race is dropped and wind down on
/// their own.
pub fn hedged_fetch(
    target: Arc<dyn FetchSink>,
    primary: &dyn Fetcher,
    fallback: Option<&dyn Fetcher>,
    clock: &dyn Clock,
    config: &HedgeConfig,
) -> Result<(), HedgeError> {
    let start = clock.now_ms();
    let request = target.request_context().id();
    let mut race = FetchRace::new(target);

    primary.start(race.new_racer());

    let winner_deadline = start + config.winner_timeout_ms;
    let fallback_deadline = start + config.fallback_after_ms;
    if let Some(fallback) = fallback
        && fallback_deadline < winner_deadline
        && !race.wait_for_winner(clock, fallback_deadline)
    {
        tracing::info!(request, "slow primary fetch, issuing fallback");
        shared::counter!(FALLBACK_STARTED).increment(1);
        fallback.start(race.new_racer());
    }

    if !race.wait_for_winner(clock, winner_deadline) {
        tracing::warn!(request, "fetch timed out");
        shared::counter!(WINNER_DEADLINE_MISSES).increment(1);
        return Err(HedgeError::WinnerDeadlineExceeded);
    }
    shared::histogram!(WINNER_LATENCY).record((clock.now_ms() - start) as f64 / 1000.0);

    let winner = race
        .winner()
        .expect("winner present after wait_for_winner returned true");
    if !winner.wait_for_done(clock, start + config.done_timeout_ms) {
        tracing::warn!(request, "fetch timed out waiting for winner to finish");
        shared::counter!(DONE_DEADLINE_MISSES).increment(1);
        return Err(HedgeError::DoneDeadlineExceeded);
    }

    Ok(())
}
