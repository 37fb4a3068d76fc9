use crate::metrics::metric_or_zero;
use crate::model::{EdgeKind, IssueGraph};
use crate::sanitize::{LabelTarget, escape_dot, sanitize_label};
use crate::theme::status_fill;
use std::collections::BTreeMap;

const TITLE_MAX_RUNES: usize = 30;
const BLOCKS_COLOR: &str = "#E53935";
const RELATED_COLOR: &str = "#999999";

/// Graphviz DOT document, left-to-right, nodes and edges in id order.
pub fn render_dot(
    graph: &IssueGraph,
    page_rank: Option<&BTreeMap<String, f64>>,
    include_related: bool,
) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [shape=box, fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str("    edge [fontname=\"Helvetica\", fontsize=8];\n");
    out.push('\n');

    for node in graph.sorted_nodes() {
        let id = escape_dot(&node.id);
        let title = sanitize_label(&node.title, TITLE_MAX_RUNES, LabelTarget::Dot);
        let label = format!("{id}\\n{title}\\nP{} {}", node.priority, node.status);
        let penwidth = page_rank
            .map(|pr| metric_or_zero(pr, &node.id))
            .filter(|pr| *pr > 0.0)
            .map_or(1.0, |pr| 1.0 + pr * 3.0);
        out.push_str(&format!(
            "    \"{id}\" [label=\"{label}\", fillcolor=\"{}\", style=filled, penwidth={penwidth:.1}];\n",
            status_fill(node.status).hex()
        ));
    }

    out.push('\n');

    for edge in graph.resolved_edges(include_related) {
        let (style, color) = match edge.kind {
            EdgeKind::Blocks => ("bold", BLOCKS_COLOR),
            EdgeKind::Related => ("dashed", RELATED_COLOR),
        };
        out.push_str(&format!(
            "    \"{}\" -> \"{}\" [style={style}, color=\"{color}\"];\n",
            escape_dot(&edge.from),
            escape_dot(&edge.to)
        ));
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, Status};

    #[test]
    fn blocked_issue_points_at_blocker() {
        let graph = IssueGraph::new(
            vec![
                Node::new("A", "Task A", Status::Open),
                Node::new("B", "Task B", Status::Blocked),
            ],
            vec![Edge::blocks("B", "A")],
        );
        let dot = render_dot(&graph, None, false);
        assert!(dot.starts_with("digraph G {\n    rankdir=LR;"));
        assert!(dot.contains("\"B\" -> \"A\" [style=bold, color=\"#E53935\"];"));
        assert!(!dot.contains("\"A\" -> \"B\""));
        assert!(dot.contains("\"A\" [label=\"A\\nTask A\\nP0 open\", fillcolor=\"#C8E6C9\""));
        assert!(dot.contains("fillcolor=\"#FFCDD2\""));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn penwidth_scales_with_pagerank() {
        let graph = IssueGraph::new(
            vec![
                Node::new("A", "a", Status::Open),
                Node::new("B", "b", Status::Open),
            ],
            vec![],
        );
        let mut pr = BTreeMap::new();
        pr.insert("A".to_string(), 0.5);
        pr.insert("B".to_string(), -1.0);
        let dot = render_dot(&graph, Some(&pr), false);
        assert!(dot.contains("penwidth=2.5"));
        assert!(dot.contains("\"B\" [label=\"B\\nb\\nP0 open\", fillcolor=\"#C8E6C9\", style=filled, penwidth=1.0];"));
    }

    #[test]
    fn escapes_ids_and_titles() {
        let graph = IssueGraph::new(
            vec![Node::new("x\\\"y", "line one\nline \"two\"", Status::Tombstone)],
            vec![],
        );
        let dot = render_dot(&graph, None, false);
        assert!(dot.contains("\"x\\\\\\\"y\" [label=\"x\\\\\\\"y\\nline one line \\\"two\\\"\\nP0 tombstone\""));
        assert!(dot.contains("fillcolor=\"#CFD8DC\""));
    }

    #[test]
    fn title_truncated_on_rune_boundary() {
        let title = "é".repeat(50);
        let graph = IssueGraph::new(vec![Node::new("A", title, Status::Open)], vec![]);
        let dot = render_dot(&graph, None, false);
        let expected = format!("A\\n{}...\\nP0 open", "é".repeat(27));
        assert!(dot.contains(&expected));
    }

    #[test]
    fn related_edges_are_dashed_when_included() {
        let graph = IssueGraph::new(
            vec![
                Node::new("A", "a", Status::Open),
                Node::new("B", "b", Status::Open),
            ],
            vec![Edge::related("A", "B")],
        );
        assert!(!render_dot(&graph, None, false).contains("->"));
        assert!(render_dot(&graph, None, true).contains("\"A\" -> \"B\" [style=dashed, color=\"#999999\"];"));
    }
}
