use crate::metrics::metric_or_zero;
use crate::model::{EdgeKind, IssueGraph, Status};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// JSON adjacency list: nodes sorted by id, edges sorted by `(from, to)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacencyGraph {
    pub nodes: Vec<AdjacencyNode>,
    pub edges: Vec<AdjacencyEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacencyNode {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: i32,
    pub labels: BTreeSet<String>,
    /// Omitted when no metrics provider was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagerank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

pub fn build_adjacency(
    graph: &IssueGraph,
    page_rank: Option<&BTreeMap<String, f64>>,
    include_related: bool,
) -> AdjacencyGraph {
    let nodes = graph
        .sorted_nodes()
        .into_iter()
        .map(|node| AdjacencyNode {
            id: node.id.clone(),
            title: node.title.clone(),
            status: node.status,
            priority: node.priority,
            labels: node.labels.clone(),
            pagerank: page_rank.map(|pr| metric_or_zero(pr, &node.id)),
        })
        .collect();

    let edges = graph
        .resolved_edges(include_related)
        .into_iter()
        .map(|edge| AdjacencyEdge {
            from: edge.from.clone(),
            to: edge.to.clone(),
            kind: edge.kind,
        })
        .collect();

    AdjacencyGraph { nodes, edges }
}
