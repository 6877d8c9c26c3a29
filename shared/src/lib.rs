//! Types and macros shared across workspace crates.

pub mod metrics_defs;

// Re-exported so the emission macros below resolve the facade through
// `$crate` and callers don't need their own `metrics` dependency.
pub use metrics;

/// Emits a counter for a [`MetricDef`](metrics_defs::MetricDef).
///
/// ```ignore
/// counter!(RACERS_STARTED).increment(1);
/// counter!(REQUESTS, "status" => "timeout").increment(1);
/// ```
#[macro_export]
macro_rules! counter {
    ($def:expr) => {
        $crate::metrics::counter!($def.name)
    };
    ($def:expr, $($label:expr => $value:expr),+ $(,)?) => {
        $crate::metrics::counter!($def.name, $($label => $value),+)
    };
}

/// Emits a histogram for a [`MetricDef`](metrics_defs::MetricDef).
#[macro_export]
macro_rules! histogram {
    ($def:expr) => {
        $crate::metrics::histogram!($def.name)
    };
    ($def:expr, $($label:expr => $value:expr),+ $(,)?) => {
        $crate::metrics::histogram!($def.name, $($label => $value),+)
    };
}
