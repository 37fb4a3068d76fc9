//! Label and reachability filters.
//!
//! Both filters are total: a label nobody carries or a root that does not
//! exist yields an empty graph, never an error.

use crate::model::{IssueGraph, Node};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Keep only issues carrying this label (case-insensitive).
    pub label: Option<String>,
    /// Keep only issues reachable from this issue through `blocks` edges.
    pub root: Option<String>,
    /// Maximum traversal depth from `root`; 0 means unlimited.
    pub max_depth: usize,
}

impl FilterOptions {
    pub fn is_noop(&self) -> bool {
        self.label.as_deref().is_none_or(str::is_empty) && self.root.as_deref().is_none_or(str::is_empty)
    }

    /// Active filters as reported in the export envelope.
    pub fn applied(&self) -> BTreeMap<String, String> {
        let mut applied = BTreeMap::new();
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            applied.insert("label".to_string(), label.to_string());
        }
        // Depth only bounds the root traversal.
        if let Some(root) = self.root.as_deref().filter(|r| !r.is_empty()) {
            applied.insert("root".to_string(), root.to_string());
            if self.max_depth > 0 {
                applied.insert("depth".to_string(), self.max_depth.to_string());
            }
        }
        applied
    }
}

/// Apply the label filter, then the root/depth filter over what remains.
///
/// Node order is preserved and only edges whose endpoints both survive are
/// kept.
pub fn filter_graph(graph: &IssueGraph, opts: &FilterOptions) -> IssueGraph {
    if opts.is_noop() {
        return graph.clone();
    }

    let mut nodes: Vec<&Node> = graph.nodes.iter().collect();
    if let Some(label) = opts.label.as_deref().filter(|l| !l.is_empty()) {
        nodes.retain(|n| n.has_label(label));
    }

    if let Some(root) = opts.root.as_deref().filter(|r| !r.is_empty()) {
        let present: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let reachable = reachable_from(graph, &present, root, opts.max_depth);
        nodes.retain(|n| reachable.contains(n.id.as_str()));
    }

    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = graph
        .edges
        .iter()
        .filter(|e| kept.contains(e.from.as_str()) && kept.contains(e.to.as_str()))
        .cloned()
        .collect();

    tracing::debug!(
        before = graph.nodes.len(),
        after = nodes.len(),
        label = ?opts.label,
        root = ?opts.root,
        depth = opts.max_depth,
        "filtered issue graph"
    );

    IssueGraph::new(nodes.into_iter().cloned().collect(), edges)
}

/// Breadth-first walk from `root` to the issues it depends on.
fn reachable_from<'a>(
    graph: &'a IssueGraph,
    present: &HashSet<&'a str>,
    root: &'a str,
    max_depth: usize,
) -> HashSet<&'a str> {
    let mut visited = HashSet::new();
    if !present.contains(root) {
        return visited;
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in graph.edges.iter().filter(|e| e.is_structural()) {
        if present.contains(edge.from.as_str()) && present.contains(edge.to.as_str()) {
            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }
    }

    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    visited.insert(root);
    queue.push_back((root, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth > 0 && depth >= max_depth {
            continue;
        }
        for &next in adjacency.get(current).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Status};

    fn chain() -> IssueGraph {
        // C depends on B, B depends on A.
        IssueGraph::new(
            vec![
                Node::new("A", "a", Status::Open).with_labels(["api"]),
                Node::new("B", "b", Status::Blocked).with_labels(["API", "ui"]),
                Node::new("C", "c", Status::Blocked).with_labels(["ui"]),
            ],
            vec![Edge::blocks("B", "A"), Edge::blocks("C", "B")],
        )
    }

    fn ids(graph: &IssueGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn label_filter_is_case_insensitive() {
        let opts = FilterOptions {
            label: Some("api".into()),
            ..Default::default()
        };
        let filtered = filter_graph(&chain(), &opts);
        assert_eq!(ids(&filtered), ["A", "B"]);
        assert_eq!(filtered.edges, vec![Edge::blocks("B", "A")]);
    }

    #[test]
    fn unknown_label_yields_empty_graph() {
        let opts = FilterOptions {
            label: Some("nope".into()),
            ..Default::default()
        };
        assert!(filter_graph(&chain(), &opts).is_empty());
    }

    #[test]
    fn root_depth_limits_traversal() {
        let opts = FilterOptions {
            root: Some("B".into()),
            max_depth: 1,
            ..Default::default()
        };
        assert_eq!(ids(&filter_graph(&chain(), &opts)), ["A", "B"]);
    }

    #[test]
    fn unlimited_depth_follows_whole_chain() {
        let opts = FilterOptions {
            root: Some("C".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_graph(&chain(), &opts)), ["A", "B", "C"]);

        let shallow = FilterOptions {
            root: Some("C".into()),
            max_depth: 1,
            ..Default::default()
        };
        assert_eq!(ids(&filter_graph(&chain(), &shallow)), ["B", "C"]);
    }

    #[test]
    fn unknown_root_yields_empty_graph() {
        let opts = FilterOptions {
            root: Some("Z".into()),
            ..Default::default()
        };
        assert!(filter_graph(&chain(), &opts).is_empty());
    }

    #[test]
    fn traversal_terminates_on_cycles() {
        let mut graph = chain();
        graph.edges.push(Edge::blocks("A", "C"));
        let opts = FilterOptions {
            root: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_graph(&graph, &opts)).len(), 3);
    }

    #[test]
    fn related_edges_are_not_traversed() {
        let graph = IssueGraph::new(
            vec![
                Node::new("A", "a", Status::Open),
                Node::new("B", "b", Status::Open),
            ],
            vec![Edge::related("A", "B")],
        );
        let opts = FilterOptions {
            root: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_graph(&graph, &opts)), ["A"]);
    }

    #[test]
    fn root_filter_runs_on_label_filtered_set() {
        let opts = FilterOptions {
            label: Some("ui".into()),
            root: Some("C".into()),
            max_depth: 0,
        };
        // A lacks the label, so the walk stops at B.
        assert_eq!(ids(&filter_graph(&chain(), &opts)), ["B", "C"]);
    }

    #[test]
    fn applied_filters_are_reported() {
        let opts = FilterOptions {
            label: Some("api".into()),
            root: Some("B".into()),
            max_depth: 2,
        };
        let applied = opts.applied();
        assert_eq!(applied["label"], "api");
        assert_eq!(applied["root"], "B");
        assert_eq!(applied["depth"], "2");
    }

    #[test]
    fn depth_without_root_is_not_reported() {
        let opts = FilterOptions {
            label: Some("api".into()),
            root: None,
            max_depth: 3,
        };
        let applied = opts.applied();
        assert_eq!(applied.len(), 1);
        assert!(!applied.contains_key("depth"));
    }
}
