//! Structured serializers: JSON adjacency, Graphviz DOT and Mermaid.
//!
//! These consume the filtered issue graph directly and never go through the
//! layout engine. [`export_graph`] wraps the chosen document in an envelope
//! that also reports counts, active filters and a short explanation of how
//! to use the output.

mod adjacency;
mod dot;
mod mermaid;

pub use adjacency::{AdjacencyEdge, AdjacencyGraph, AdjacencyNode, build_adjacency};
pub use dot::render_dot;
pub use mermaid::{MermaidOptions, render_mermaid};

use crate::error::Result;
use crate::filter::{FilterOptions, filter_graph};
use crate::metrics::MetricsProvider;
use crate::model::IssueGraph;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Dot,
    Mermaid,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Dot => "dot",
            Self::Mermaid => "mermaid",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphExportConfig {
    pub format: ExportFormat,
    pub filter: FilterOptions,
    /// Provenance hash of the input data, echoed in the envelope.
    pub data_hash: Option<String>,
    pub include_related: bool,
    pub no_dependencies_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub what: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to_render: Option<String>,
    pub when_to_use: String,
}

impl Explanation {
    fn new(what: &str, how_to_render: Option<&str>, when_to_use: &str) -> Self {
        Self {
            what: what.to_string(),
            how_to_render: how_to_render.map(str::to_string),
            when_to_use: when_to_use.to_string(),
        }
    }

    fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Dot => Self::new(
                "Dependency graph in Graphviz DOT format",
                Some("Save to file.dot, run: dot -Tpng file.dot -o graph.png"),
                "When you need a visual overview of dependencies for documentation or debugging",
            ),
            ExportFormat::Mermaid => Self::new(
                "Dependency graph in Mermaid diagram format",
                Some("Paste into any Markdown renderer that supports Mermaid, or use mermaid.live"),
                "When you need an embeddable diagram for documentation or GitHub issues",
            ),
            ExportFormat::Json => Self::new(
                "Dependency graph as JSON adjacency list",
                None,
                "When you need programmatic access to the graph structure",
            ),
        }
    }

    fn empty() -> Self {
        Self::new(
            "Empty graph - no issues match the filter criteria",
            None,
            "Adjust filter parameters to include more issues",
        )
    }
}

/// Export envelope. Text formats carry their document in `graph`, JSON
/// carries it in `adjacency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExportResult {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
    pub nodes: usize,
    pub edges: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters_applied: BTreeMap<String, String>,
    pub explanation: Explanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacency: Option<AdjacencyGraph>,
}

impl GraphExportResult {
    /// The envelope as 2-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        pretty_json(self)
    }

    /// The bare document for the chosen format.
    pub fn document(&self) -> Result<String> {
        match (&self.graph, &self.adjacency) {
            (Some(graph), _) => Ok(graph.clone()),
            (None, Some(adjacency)) => pretty_json(adjacency),
            (None, None) => pretty_json(&AdjacencyGraph {
                nodes: Vec::new(),
                edges: Vec::new(),
            }),
        }
    }
}

pub(crate) fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Filter the graph and serialize it in `config.format`.
///
/// Never fails on empty input: an empty filtered graph still yields a valid
/// (empty) document with an explanation saying so.
pub fn export_graph(
    graph: &IssueGraph,
    metrics: Option<&dyn MetricsProvider>,
    config: &GraphExportConfig,
) -> GraphExportResult {
    let filtered = filter_graph(graph, &config.filter);
    let edges = filtered.resolved_edges(config.include_related).len();
    let page_rank = metrics.map(|m| m.page_rank());

    tracing::debug!(
        format = config.format.as_str(),
        nodes = filtered.nodes.len(),
        edges,
        has_metrics = metrics.is_some(),
        "exporting issue graph"
    );

    let explanation = if filtered.is_empty() {
        Explanation::empty()
    } else {
        Explanation::for_format(config.format)
    };

    let (graph_text, adjacency) = match config.format {
        ExportFormat::Dot => (
            Some(render_dot(&filtered, page_rank, config.include_related)),
            None,
        ),
        ExportFormat::Mermaid => {
            let options = MermaidOptions {
                no_dependencies_placeholder: config.no_dependencies_placeholder,
                include_related: config.include_related,
            };
            (Some(render_mermaid(&filtered, &options)), None)
        }
        ExportFormat::Json => (
            None,
            Some(build_adjacency(&filtered, page_rank, config.include_related)),
        ),
    };

    GraphExportResult {
        format: config.format,
        graph: graph_text,
        nodes: filtered.nodes.len(),
        edges,
        filters_applied: config.filter.applied(),
        explanation,
        data_hash: config.data_hash.clone().filter(|h| !h.is_empty()),
        adjacency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, Status};

    fn graph() -> IssueGraph {
        IssueGraph::new(
            vec![
                Node::new("A", "Task A", Status::Open).with_labels(["api"]),
                Node::new("B", "Task B", Status::Blocked).with_labels(["api"]),
                Node::new("C", "Task C", Status::Closed),
            ],
            vec![
                Edge::blocks("B", "A"),
                Edge::blocks("C", "B"),
                Edge::related("A", "C"),
            ],
        )
    }

    #[test]
    fn envelope_reports_counts_and_filters() {
        let config = GraphExportConfig {
            format: ExportFormat::Dot,
            filter: FilterOptions {
                label: Some("api".into()),
                ..Default::default()
            },
            data_hash: Some("abc123".into()),
            ..Default::default()
        };
        let result = export_graph(&graph(), None, &config);
        assert_eq!(result.nodes, 2);
        assert_eq!(result.edges, 1);
        assert_eq!(result.filters_applied["label"], "api");
        assert_eq!(result.data_hash.as_deref(), Some("abc123"));
        assert!(result.graph.as_deref().unwrap().contains("\"B\" -> \"A\""));
        assert!(result.adjacency.is_none());
    }

    #[test]
    fn json_envelope_is_indented_with_trailing_newline() {
        let result = export_graph(&graph(), None, &GraphExportConfig::default());
        let json = result.to_json().unwrap();
        assert!(json.starts_with("{\n  \"format\": \"json\""));
        assert!(json.ends_with("}\n"));
        assert!(!json.contains("filters_applied"));
        assert!(!json.contains("how_to_render"));
        let doc = result.document().unwrap();
        assert!(doc.starts_with("{\n  \"nodes\": ["));
    }

    #[test]
    fn empty_result_still_has_document() {
        let config = GraphExportConfig {
            format: ExportFormat::Mermaid,
            filter: FilterOptions {
                label: Some("missing".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = export_graph(&graph(), None, &config);
        assert_eq!(result.nodes, 0);
        assert_eq!(
            result.explanation.what,
            "Empty graph - no issues match the filter criteria"
        );
        assert!(result.document().unwrap().starts_with("graph TD\n"));
    }

    #[test]
    fn edge_count_matches_emitted_edges() {
        for include_related in [false, true] {
            let config = GraphExportConfig {
                format: ExportFormat::Json,
                include_related,
                ..Default::default()
            };
            let result = export_graph(&graph(), None, &config);
            let adjacency = result.adjacency.as_ref().unwrap();
            assert_eq!(result.edges, adjacency.edges.len());
        }
    }
}
