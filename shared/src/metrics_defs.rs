//! Metric declarations.
//!
//! Each crate in the workspace declares its metrics as [`MetricDef`]
//! constants in its own `metrics_defs` module and lists them in an
//! `ALL_METRICS` slice. Names and descriptions stay greppable in one
//! place per crate, [`register_all`] hands the descriptions to the
//! installed recorder at startup, and [`markdown_table`] renders the
//! slice for operator docs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Gauge => "Gauge",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

impl MetricDef {
    /// Describes this metric to the installed recorder, so exporters can
    /// surface the description next to the series.
    pub fn register(&self) {
        match self.metric_type {
            MetricType::Counter => metrics::describe_counter!(self.name, self.description),
            MetricType::Gauge => metrics::describe_gauge!(self.name, self.description),
            MetricType::Histogram => metrics::describe_histogram!(self.name, self.description),
        }
    }
}

/// Registers a crate's `ALL_METRICS` slice with the installed recorder.
pub fn register_all(defs: &[MetricDef]) {
    for def in defs {
        def.register();
    }
}

/// Renders metric definitions as a markdown table for METRICS.md-style
/// operator documentation.
pub fn markdown_table(defs: &[MetricDef]) -> String {
    let mut lines = vec![
        "| Metric | Type | Description |".to_string(),
        "|--------|------|-------------|".to_string(),
    ];
    for def in defs {
        lines.push(format!(
            "| `{}` | {} | {} |",
            def.name,
            def.metric_type.as_str(),
            def.description
        ));
    }
    lines.join("\n")
}
