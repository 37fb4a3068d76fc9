//! Issue graph data model.
//!
//! Nodes are issues, edges are dependencies pointing from the dependent issue
//! to the issue it depends on: when `B` is blocked by `A` the edge is `B -> A`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Closed,
    /// Deleted issue kept for history; rendered like `Closed`.
    Tombstone,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
            Self::Tombstone => "tombstone",
        }
    }

    pub fn is_closed_like(self) -> bool {
        matches!(self, Self::Closed | Self::Tombstone)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue as seen by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: Status) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            priority: 0,
            labels: BTreeSet::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Case-insensitive label membership.
    pub fn has_label(&self, label: &str) -> bool {
        let wanted = label.to_lowercase();
        self.labels.iter().any(|l| l.to_lowercase() == wanted)
    }
}

/// Kind of dependency relationship.
///
/// Only `Blocks` is structural. Any other kind found in input data
/// (`parent-child`, `discovered-from`, ...) is read as `Related`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum EdgeKind {
    #[default]
    Blocks,
    Related,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Related => "related",
        }
    }
}

impl From<String> for EdgeKind {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case("blocks") {
            Self::Blocks
        } else {
            Self::Related
        }
    }
}

/// Dependency edge: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn blocks(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Blocks,
        }
    }

    pub fn related(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Related,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind == EdgeKind::Blocks
    }
}

/// Issue in the shape the issue store exports it: the node plus its
/// embedded dependency list. Entries in `dependencies` may be `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueRecord {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub dependencies: Vec<Option<DependencyRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyRecord {
    pub depends_on_id: String,
    #[serde(rename = "type", alias = "dep_type", default)]
    pub kind: EdgeKind,
}

/// Nodes plus dependency edges. Edges may reference ids that are not in
/// `nodes`; every consumer drops those.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl IssueGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Flatten issue records into nodes and edges, skipping null dependencies.
    pub fn from_records(records: Vec<IssueRecord>) -> Self {
        let mut nodes = Vec::with_capacity(records.len());
        let mut edges = Vec::new();
        for record in records {
            for dep in record.dependencies.into_iter().flatten() {
                edges.push(Edge {
                    from: record.node.id.clone(),
                    to: dep.depends_on_id,
                    kind: dep.kind,
                });
            }
            nodes.push(record.node);
        }
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Nodes ordered by id.
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Edges whose endpoints are both present, ordered by `(from, to, kind)`.
    /// `Related` edges are only kept when `include_related` is set.
    pub fn resolved_edges(&self, include_related: bool) -> Vec<&Edge> {
        let ids = self.node_ids();
        let mut edges: Vec<&Edge> = self
            .edges
            .iter()
            .filter(|e| include_related || e.is_structural())
            .filter(|e| ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()))
            .collect();
        edges.sort_by(|a, b| {
            a.from
                .cmp(&b.from)
                .then_with(|| a.to.cmp(&b.to))
                .then_with(|| a.kind.cmp(&b.kind))
        });
        edges
    }
}
