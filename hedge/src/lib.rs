//! Hedged fetching: race several fetch attempts toward one downstream
//! sink and keep only the first that produces output.
//!
//! A slow primary fetch can be backed up by opportunistic secondary
//! fetches without the caller managing cancellation, draining, or the
//! lifetimes of the losers. [`race::FetchRace`] arbitrates a single
//! permanent winner; every other attempt keeps running but its output is
//! silently discarded. [`driver::hedged_fetch`] is the caller-side
//! policy: start the primary, start a fallback when the primary is slow,
//! give up when nobody produces output in time.
//!
//! Timeouts here are soft. A losing or abandoned fetch is never
//! cancelled; it runs to completion against a sink that goes nowhere.

pub mod clock;
pub mod config;
pub mod driver;
pub mod errors;
pub mod metrics_defs;
pub mod race;
pub mod sink;
pub mod wait;

#[cfg(test)]
mod testutils;

pub use clock::{Clock, MonotonicClock};
pub use config::HedgeConfig;
pub use driver::{Fetcher, hedged_fetch};
pub use errors::HedgeError;
pub use race::{FetchRace, Racer};
pub use sink::{FetchSink, RequestContext, ResponseInfo, SinkInfo};
pub use wait::DeadlineWaiter;
