//! Leveled layout for snapshot rendering.
//!
//! Columns are critical-path levels (left to right), rows inside a column are
//! ordered by pagerank, and every column is centred on the tallest one.

use crate::error::{RenderError, Result};
use crate::metrics::{MetricsProvider, metric_or_zero};
use crate::model::{Edge, IssueGraph, Status};
use crate::sanitize::truncate_runes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const PADDING: f64 = 36.0;
pub const HEADER_HEIGHT: f64 = 120.0;
pub const MIN_CANVAS_WIDTH: u32 = 640;
pub const MIN_CANVAS_HEIGHT: u32 = 480;
/// Metric values closer than this compare equal.
pub const RANK_EPSILON: f64 = 1e-6;

const NODE_TITLE_MAX_RUNES: usize = 44;
const DEFAULT_TITLE: &str = "Graph Snapshot";

/// Named bundle of spacing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LayoutPreset {
    #[default]
    Compact,
    Roomy,
}

impl LayoutPreset {
    /// `roomy` (any case) selects the roomy preset; anything else is compact.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("roomy") {
            Self::Roomy
        } else {
            Self::Compact
        }
    }

    pub fn spacing(self) -> Spacing {
        match self {
            Self::Compact => Spacing {
                node_width: 170.0,
                node_height: 70.0,
                col_gap: 80.0,
                row_gap: 40.0,
            },
            Self::Roomy => Spacing {
                node_width: 190.0,
                node_height: 82.0,
                col_gap: 110.0,
                row_gap: 55.0,
            },
        }
    }
}

impl From<String> for LayoutPreset {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub node_width: f64,
    pub node_height: f64,
    pub col_gap: f64,
    pub row_gap: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub preset: LayoutPreset,
    /// Summary title; blank falls back to "Graph Snapshot".
    pub title: Option<String>,
    /// Provenance hash of the input data, shown in the summary.
    pub data_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: i32,
    pub level: u32,
    pub page_rank: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    /// Midpoint of the right border, where outgoing edges start.
    pub fn right_anchor(&self) -> (f64, f64) {
        (self.x + self.width, self.y + self.height / 2.0)
    }

    /// Midpoint of the left border, where incoming edges end.
    pub fn left_anchor(&self) -> (f64, f64) {
        (self.x, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bottleneck {
    pub id: String,
    pub score: f64,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.id, self.score)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub data_hash: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub top_bottleneck: Bottleneck,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub header_height: f64,
    pub summary: Summary,
}

/// Lay out `graph` for a snapshot. Fails only when the graph is empty.
pub fn compute_layout(
    graph: &IssueGraph,
    metrics: &dyn MetricsProvider,
    options: &LayoutOptions,
) -> Result<LayoutResult> {
    if graph.is_empty() {
        return Err(RenderError::EmptyGraph);
    }

    let spacing = options.preset.spacing();
    let page_rank = metrics.page_rank();
    let critical = metrics.critical_path_score();

    let mut columns: BTreeMap<u32, Vec<LayoutNode>> = BTreeMap::new();
    for node in &graph.nodes {
        let level = level_for(metric_or_zero(critical, &node.id));
        columns.entry(level).or_default().push(LayoutNode {
            id: node.id.clone(),
            title: truncate_runes(&node.title, NODE_TITLE_MAX_RUNES),
            status: node.status,
            priority: node.priority,
            level,
            page_rank: metric_or_zero(page_rank, &node.id),
            x: 0.0,
            y: 0.0,
            width: spacing.node_width,
            height: spacing.node_height,
        });
    }

    let max_level = columns.keys().next_back().copied().unwrap_or(1);
    let max_rows = columns.values().map(Vec::len).max().unwrap_or(0);
    let pitch = spacing.node_height + spacing.row_gap;
    let midline = PADDING + HEADER_HEIGHT + (max_rows.saturating_sub(1)) as f64 * pitch / 2.0;

    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for (level, mut column) in columns {
        order_column(&mut column);
        let start_y = -((column.len() - 1) as f64) * pitch / 2.0;
        for (idx, mut node) in column.into_iter().enumerate() {
            node.x = PADDING + f64::from(level - 1) * (spacing.node_width + spacing.col_gap);
            node.y = midline + start_y + idx as f64 * pitch;
            nodes.push(node);
        }
    }

    let width = PADDING * 2.0
        + f64::from(max_level) * (spacing.node_width + spacing.col_gap)
        + spacing.node_width;
    let height = PADDING * 2.0 + HEADER_HEIGHT + max_rows as f64 * pitch + spacing.node_height;

    let edges: Vec<Edge> = graph.resolved_edges(false).into_iter().cloned().collect();
    let present: BTreeSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let top_bottleneck = top_bottleneck(metrics.betweenness(), &present);

    let title = options
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let summary = Summary {
        title,
        data_hash: options.data_hash.clone().unwrap_or_default(),
        node_count: nodes.len(),
        edge_count: edges.len(),
        cycle_count: metrics.cycles().len(),
        top_bottleneck,
    };

    tracing::debug!(
        nodes = summary.node_count,
        edges = summary.edge_count,
        levels = max_level,
        rows = max_rows,
        preset = ?options.preset,
        "computed snapshot layout"
    );

    Ok(LayoutResult {
        nodes,
        edges,
        canvas_width: (width.ceil() as u32).max(MIN_CANVAS_WIDTH),
        canvas_height: (height.ceil() as u32).max(MIN_CANVAS_HEIGHT),
        header_height: HEADER_HEIGHT,
        summary,
    })
}

fn level_for(critical_path_depth: f64) -> u32 {
    critical_path_depth.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Pagerank descending, id ascending among pageranks within epsilon.
///
/// Sorting directly with an epsilon comparator is not a total order, so the
/// column is sorted exactly first and runs of neighbours within epsilon are
/// then re-sorted by id.
fn order_column(column: &mut [LayoutNode]) {
    column.sort_by(|a, b| {
        b.page_rank
            .total_cmp(&a.page_rank)
            .then_with(|| a.id.cmp(&b.id))
    });
    let mut start = 0;
    for idx in 1..=column.len() {
        let run_ends = idx == column.len()
            || (column[idx - 1].page_rank - column[idx].page_rank).abs() > RANK_EPSILON;
        if run_ends {
            column[start..idx].sort_by(|a, b| a.id.cmp(&b.id));
            start = idx;
        }
    }
}

/// Highest betweenness among rendered nodes, lower id on ties. Falls back to
/// the alphabetically first node with a zero score.
fn top_bottleneck(betweenness: &BTreeMap<String, f64>, present: &BTreeSet<&str>) -> Bottleneck {
    let mut best: Option<(&str, f64)> = None;
    for &id in present {
        let Some(score) = betweenness.get(id).copied().filter(|v| v.is_finite()) else {
            continue;
        };
        if best.is_none_or(|(_, top)| score > top + RANK_EPSILON) {
            best = Some((id, score));
        }
    }
    match best {
        Some((id, score)) => Bottleneck {
            id: id.to_string(),
            score,
        },
        None => Bottleneck {
            id: present.iter().next().map(|id| id.to_string()).unwrap_or_default(),
            score: 0.0,
        },
    }
}
