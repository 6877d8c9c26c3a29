//! First-to-output fetch race.
//!
//! [`FetchRace`] runs any number of competing fetches toward one target
//! sink. Each fetch writes through its own [`Racer`], itself a
//! [`FetchSink`], so a fetcher cannot tell a racer from the real target.
//! The first racer to produce output (headers, a write, or a flush) is
//! latched as the permanent winner and proxies everything to the target;
//! every other racer keeps reporting success while its output is dropped.
//!
//! Dropping the race disqualifies all racers: their back-reference and
//! cached target handle are cleared under each racer's lock. A racer
//! still mid-fetch stays alive through the fetcher's own `Arc` handle
//! and discards output from then on, winner or not.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use http::HeaderMap;
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::metrics_defs::RACERS_STARTED;
use crate::sink::{FetchSink, SinkInfo};
use crate::wait::DeadlineWaiter;

/// Winner arbitration cell, shared by the race handle and every racer.
struct WinnerCell {
    winner: Mutex<Option<Weak<Racer>>>,
    signal: DeadlineWaiter,
}

impl WinnerCell {
    /// Latches `racer` as the winner if the slot is still empty, then
    /// reports whether `racer` holds the win. Idempotent for the winner;
    /// false forever for everyone else.
    fn finish(&self, racer: &Racer) -> bool {
        let mut winner = self.winner.lock();
        if winner.is_none() {
            *winner = Some(racer.self_handle.clone());
            self.signal.notify_all();
        }
        winner
            .as_ref()
            .is_some_and(|current| std::ptr::eq(current.as_ptr(), racer))
    }
}

struct RacerState {
    /// Back-reference into the race; cleared on disqualification.
    cell: Option<Arc<WinnerCell>>,
    /// Cached target handle, cleared on disqualification so a racer that
    /// claimed the win in memory can no longer reach the target once the
    /// race has been torn down.
    target: Option<Arc<dyn FetchSink>>,
    done: bool,
}

/// One competing fetch attempt.
///
/// Handed to a fetcher as its output sink. Output-producing calls first
/// try to claim the win; on success they forward to the target, otherwise
/// they report success and drop the data. Every output call re-checks
/// disqualification instead of caching the win: a racer may hold the win
/// flag yet have been severed from the target by race teardown.
pub struct Racer {
    self_handle: Weak<Racer>,
    state: Mutex<RacerState>,
    done_signal: DeadlineWaiter,
    info: SinkInfo,
}

impl Racer {
    fn new(cell: Arc<WinnerCell>, target: Arc<dyn FetchSink>) -> Arc<Racer> {
        // Snapshotting the request headers here is sound: racers are only
        // constructed through the race, which holds the target for its
        // whole lifetime. The caller guarantees request headers do not
        // mutate while the race runs.
        let info = SinkInfo::new(
            target.request_headers().clone(),
            target.request_context().clone(),
        );
        Arc::new_cyclic(|self_handle| Racer {
            self_handle: self_handle.clone(),
            state: Mutex::new(RacerState {
                cell: Some(cell),
                target: Some(target),
                done: false,
            }),
            done_signal: DeadlineWaiter::new(),
            info,
        })
    }

    /// Attempts to claim the win, returning the target handle while this
    /// racer holds it. Runs under the racer lock, then the winner-cell
    /// lock; the guard is dropped before the caller forwards anything.
    fn claim(&self) -> Option<Arc<dyn FetchSink>> {
        let state = self.state.lock();
        let cell = state.cell.as_ref()?;
        if cell.finish(self) {
            state.target.clone()
        } else {
            None
        }
    }

    /// True while this racer is the winner. The first output-producing
    /// call decides the race; a disqualified racer always reports false,
    /// even if it had previously claimed the win.
    pub fn claim_win(&self) -> bool {
        self.claim().is_some()
    }

    /// Severs this racer from the race. No further output reaches the
    /// target.
    fn disqualify(&self) {
        let mut state = self.state.lock();
        state.cell = None;
        state.target = None;
    }

    /// Blocks until this racer's fetch has called `done`, or until
    /// `deadline_ms` (absolute, on `clock`) passes.
    ///
    /// Safe on attached and disqualified racers alike; the handle keeps
    /// the racer alive regardless of who wins or when the race ends.
    pub fn wait_for_done(&self, clock: &dyn Clock, deadline_ms: i64) -> bool {
        let mut state = self.state.lock();
        self.done_signal
            .wait_until(&mut state, clock, deadline_ms, |state| state.done)
    }
}

impl FetchSink for Racer {
    fn info(&self) -> &SinkInfo {
        &self.info
    }

    fn headers_complete(&self) {
        let Some(target) = self.claim() else { return };
        // The single point where response metadata crosses over to the
        // winner's output path.
        target.info().merge_response(self.info.response());
        target.headers_complete();
    }

    fn write(&self, data: Bytes) -> bool {
        match self.claim() {
            Some(target) => target.write(data),
            // Dropped, but reported as accepted: losers run to completion
            // without ever noticing the race.
            None => true,
        }
    }

    fn flush(&self) -> bool {
        match self.claim() {
            Some(target) => target.flush(),
            None => true,
        }
    }

    fn done(&self, success: bool) {
        if let Some(target) = self.claim() {
            target.done(success);
        }
        let mut state = self.state.lock();
        assert!(!state.done, "done() called twice on a racer");
        state.done = true;
        self.done_signal.notify_all();
    }

    fn is_cached_result_valid(&self, headers: &HeaderMap) -> bool {
        // Clone the handle out first; a match on the lock() temporary
        // would keep the racer guard held across the target call.
        let target = self.state.lock().target.clone();
        match target {
            Some(target) => target.is_cached_result_valid(headers),
            // Once disqualified the answer is never consulted for real;
            // keep reporting validity so the fetch winds down without
            // extra work.
            None => true,
        }
    }

    fn is_background_fetch(&self) -> bool {
        let target = self.state.lock().target.clone();
        match target {
            Some(target) => target.is_background_fetch(),
            // Disqualified output is being discarded; let the remaining
            // work be deprioritized.
            None => true,
        }
    }
}

/// Coordinates a set of [`Racer`]s toward one target sink.
///
/// The race holds the target for its whole lifetime and owns every racer
/// it creates; racer handles stay valid as long as the race is alive.
/// Dropping the race disqualifies all racers. A racer still mid-fetch
/// survives through the fetcher's own handle and releases itself when
/// that handle drops.
pub struct FetchRace {
    target: Arc<dyn FetchSink>,
    cell: Arc<WinnerCell>,
    racers: Vec<Arc<Racer>>,
}

impl FetchRace {
    pub fn new(target: Arc<dyn FetchSink>) -> Self {
        FetchRace {
            target,
            cell: Arc::new(WinnerCell {
                winner: Mutex::new(None),
                signal: DeadlineWaiter::new(),
            }),
            racers: Vec::new(),
        }
    }

    /// Creates a new racer competing to be the first to write to the
    /// target.
    pub fn new_racer(&mut self) -> Arc<Racer> {
        let racer = Racer::new(Arc::clone(&self.cell), Arc::clone(&self.target));
        self.racers.push(Arc::clone(&racer));
        shared::counter!(RACERS_STARTED).increment(1);
        racer
    }

    /// Blocks until some racer produces output or `deadline_ms` passes.
    ///
    /// Returns true once a winner exists; from then on every call returns
    /// true immediately, so repeated calls with growing deadlines drive a
    /// hedging policy. A false return changes nothing: racers keep
    /// running, and a later call may still find a winner.
    pub fn wait_for_winner(&self, clock: &dyn Clock, deadline_ms: i64) -> bool {
        let mut winner = self.cell.winner.lock();
        self.cell
            .signal
            .wait_until(&mut winner, clock, deadline_ms, |winner| winner.is_some())
    }

    /// The winner, if one has been latched. Never reverts to `None` and
    /// never changes identity once set.
    pub fn winner(&self) -> Option<Arc<Racer>> {
        // The upgrade cannot fail while `self` is alive: `racers` holds a
        // strong handle to every racer this race created.
        self.cell.winner.lock().as_ref().and_then(Weak::upgrade)
    }
}

impl Drop for FetchRace {
    fn drop(&mut self) {
        // Racers may no longer touch the target, winner or not. Anything
        // still mid-fetch lives on through the fetcher's handle and drops
        // its output from here on.
        for racer in &self.racers {
            racer.disqualify();
        }
    }
}
