//! Read-only graph metrics supplied by an external analyzer.
//!
//! Nothing in this crate computes centrality or critical paths; the values
//! are only consumed for visual emphasis (penwidth, leveling) and the
//! snapshot summary.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Source of precomputed graph metrics keyed by issue id.
pub trait MetricsProvider {
    fn page_rank(&self) -> &BTreeMap<String, f64>;
    fn betweenness(&self) -> &BTreeMap<String, f64>;
    fn critical_path_score(&self) -> &BTreeMap<String, f64>;
    fn cycles(&self) -> &[Vec<String>];
    fn topological_order(&self) -> &[String];
}

/// Plain metrics table, typically loaded from the analyzer's JSON output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphMetrics {
    #[serde(alias = "pagerank")]
    pub page_rank: BTreeMap<String, f64>,
    pub betweenness: BTreeMap<String, f64>,
    #[serde(alias = "critical_path", alias = "criticalPath")]
    pub critical_path_score: BTreeMap<String, f64>,
    pub cycles: Vec<Vec<String>>,
    #[serde(alias = "topo_order")]
    pub topological_order: Vec<String>,
}

impl GraphMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_rank(mut self, id: impl Into<String>, value: f64) -> Self {
        self.page_rank.insert(id.into(), value);
        self
    }

    pub fn with_betweenness(mut self, id: impl Into<String>, value: f64) -> Self {
        self.betweenness.insert(id.into(), value);
        self
    }

    pub fn with_critical_path(mut self, id: impl Into<String>, value: f64) -> Self {
        self.critical_path_score.insert(id.into(), value);
        self
    }

    pub fn with_cycle<I, S>(mut self, cycle: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cycles.push(cycle.into_iter().map(Into::into).collect());
        self
    }
}

impl MetricsProvider for GraphMetrics {
    fn page_rank(&self) -> &BTreeMap<String, f64> {
        &self.page_rank
    }

    fn betweenness(&self) -> &BTreeMap<String, f64> {
        &self.betweenness
    }

    fn critical_path_score(&self) -> &BTreeMap<String, f64> {
        &self.critical_path_score
    }

    fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    fn topological_order(&self) -> &[String] {
        &self.topological_order
    }
}

/// Missing or non-finite values read as zero.
pub(crate) fn metric_or_zero(map: &BTreeMap<String, f64>, id: &str) -> f64 {
    map.get(id).copied().filter(|v| v.is_finite()).unwrap_or(0.0)
}
