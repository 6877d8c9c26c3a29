use shared::metrics_defs::{MetricDef, MetricType};

pub const RACERS_STARTED: MetricDef = MetricDef {
    name: "hedge.racers.started",
    metric_type: MetricType::Counter,
    description: "Racers entered into fetch races",
};

pub const FALLBACK_STARTED: MetricDef = MetricDef {
    name: "hedge.fallback.started",
    metric_type: MetricType::Counter,
    description: "Fallback fetches launched after a slow primary",
};

pub const WINNER_DEADLINE_MISSES: MetricDef = MetricDef {
    name: "hedge.winner.deadline_misses",
    metric_type: MetricType::Counter,
    description: "Hedged fetches where no racer produced output in time",
};

pub const DONE_DEADLINE_MISSES: MetricDef = MetricDef {
    name: "hedge.done.deadline_misses",
    metric_type: MetricType::Counter,
    description: "Hedged fetches whose winner did not finish in time",
};

pub const WINNER_LATENCY: MetricDef = MetricDef {
    name: "hedge.winner.latency",
    metric_type: MetricType::Histogram,
    description: "Seconds from fetch start until a winner produced output",
};

pub const ALL_METRICS: &[MetricDef] = &[
    RACERS_STARTED,
    FALLBACK_STARTED,
    WINNER_DEADLINE_MISSES,
    DONE_DEADLINE_MISSES,
    WINNER_LATENCY,
];
