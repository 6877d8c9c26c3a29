use serde::Deserialize;

/// Deadlines driving [`hedged_fetch`](crate::driver::hedged_fetch).
///
/// All values are milliseconds relative to the start of the fetch; the
/// driver turns them into absolute deadlines on its clock so successive
/// waits compose without drift.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HedgeConfig {
    /// How long the primary fetch may run without producing output before
    /// the fallback is started. A value at or beyond `winner_timeout_ms`
    /// disables the fallback.
    pub fallback_after_ms: i64,
    /// How long any attempt may take to produce its first output.
    pub winner_timeout_ms: i64,
    /// How long the winning attempt may take to finish, also counted from
    /// the start of the fetch.
    pub done_timeout_ms: i64,
}

impl HedgeConfig {
    /// Aggressive hedging: fall back almost immediately, give up early.
    pub fn low_latency() -> Self {
        HedgeConfig {
            fallback_after_ms: 15,
            winner_timeout_ms: 500,
            done_timeout_ms: 1500,
        }
    }

    /// Conservative hedging: give the primary a long head start.
    pub fn patient() -> Self {
        HedgeConfig {
            fallback_after_ms: 1000,
            winner_timeout_ms: 5000,
            done_timeout_ms: 30_000,
        }
    }
}

impl Default for HedgeConfig {
    fn default() -> Self {
        HedgeConfig {
            fallback_after_ms: 250,
            winner_timeout_ms: 2000,
            done_timeout_ms: 10_000,
        }
    }
}
