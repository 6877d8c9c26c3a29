use thiserror::Error;

/// Errors surfaced by the hedged-fetch driver.
///
/// Deadline misses are soft: the underlying fetches keep running and
/// their output is discarded once the race is dropped. A fetch that
/// completes but fails reports through the target sink's `done(false)`,
/// not through this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeError {
    #[error("no fetch produced output before the deadline")]
    WinnerDeadlineExceeded,

    #[error("winning fetch did not complete before the deadline")]
    DoneDeadlineExceeded,
}
