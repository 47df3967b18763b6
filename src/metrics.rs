//! Metric side channel for pruning observability
//!
//! A lean collector the pruning callback records into; the training side
//! decides what to do with the records (export, print, ignore).

use serde::{Deserialize, Serialize};

/// Metrics emitted by the pruning callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Scheduled target sparsity at an update step.
    Sparsity,
    /// Number of parameters selected as prunable.
    PrunableParams,
}

impl Metric {
    /// Stable metric name for export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sparsity => "sparsity",
            Metric::PrunableParams => "prunable_params",
        }
    }
}

/// One recorded metric value, keyed by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub metric: Metric,
    pub step: usize,
    pub value: f64,
}

/// Append-only metric collector.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    records: Vec<MetricRecord>,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric value at a step.
    pub fn record(&mut self, metric: Metric, step: usize, value: f64) {
        self.records.push(MetricRecord {
            metric,
            step,
            value,
        });
    }

    /// All records in recording order.
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Most recent value of a metric, if any.
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.records
            .iter()
            .rev()
            .find(|r| r.metric == metric)
            .map(|r| r.value)
    }

    /// Total number of records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}
