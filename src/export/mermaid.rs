use crate::model::{EdgeKind, IssueGraph, Status};
use crate::sanitize::{LabelTarget, SafeIdRegistry, sanitize_label};
use crate::theme::{STATUS_BLOCKED, STATUS_CLOSED, STATUS_IN_PROGRESS, STATUS_OPEN};

const TITLE_MAX_RUNES: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MermaidOptions {
    /// Emit a `No Dependencies` node when a non-empty graph has no edges.
    pub no_dependencies_placeholder: bool,
    pub include_related: bool,
}

fn class_name(status: Status) -> &'static str {
    match status {
        Status::Open => "open",
        Status::InProgress => "inprogress",
        Status::Blocked => "blocked",
        Status::Closed | Status::Tombstone => "closed",
    }
}

pub fn render_mermaid(graph: &IssueGraph, options: &MermaidOptions) -> String {
    let mut out = String::from("graph TD\n");
    for (class, fill) in [
        ("open", STATUS_OPEN),
        ("inprogress", STATUS_IN_PROGRESS),
        ("blocked", STATUS_BLOCKED),
        ("closed", STATUS_CLOSED),
    ] {
        out.push_str(&format!(
            "    classDef {class} fill:{},stroke:#333,color:#000\n",
            fill.hex()
        ));
    }
    out.push('\n');

    let nodes = graph.sorted_nodes();
    // Claim safe ids in id order before emitting anything.
    let mut registry = SafeIdRegistry::new();
    for node in &nodes {
        registry.get(&node.id);
    }

    for node in &nodes {
        let safe = registry.get(&node.id);
        let label_id = sanitize_label(&node.id, usize::MAX, LabelTarget::Mermaid);
        let title = sanitize_label(&node.title, TITLE_MAX_RUNES, LabelTarget::Mermaid);
        out.push_str(&format!("    {safe}[\"{label_id}<br/>{title}\"]\n"));
        out.push_str(&format!("    class {safe} {}\n", class_name(node.status)));
    }

    out.push('\n');

    let edges = graph.resolved_edges(options.include_related);
    for edge in &edges {
        let arrow = match edge.kind {
            EdgeKind::Blocks => "==>",
            EdgeKind::Related => "-.->",
        };
        out.push_str(&format!(
            "    {} {arrow} {}\n",
            registry.get(&edge.from),
            registry.get(&edge.to)
        ));
    }

    if options.no_dependencies_placeholder && edges.is_empty() && !nodes.is_empty() {
        let placeholder = registry.reserve("NoLinks");
        out.push_str(&format!("    {placeholder}[\"No Dependencies\"]\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};

    fn pair() -> IssueGraph {
        IssueGraph::new(
            vec![
                Node::new("bv-2", "Ship [beta] \"now\"", Status::InProgress),
                Node::new("bv-1", "Design", Status::Tombstone),
            ],
            vec![Edge::blocks("bv-2", "bv-1")],
        )
    }

    #[test]
    fn renders_classes_nodes_and_edges() {
        let out = render_mermaid(&pair(), &MermaidOptions::default());
        assert!(out.starts_with("graph TD\n    classDef open fill:#C8E6C9,stroke:#333,color:#000\n"));
        assert!(out.contains("classDef inprogress fill:#BBDEFB"));
        assert!(out.contains("    bv-1[\"bv-1<br/>Design\"]\n    class bv-1 closed\n"));
        assert!(out.contains("    bv-2[\"bv-2<br/>Ship (beta) 'now'\"]\n    class bv-2 inprogress\n"));
        assert!(out.ends_with("    bv-2 ==> bv-1\n"));
    }

    #[test]
    fn colliding_ids_get_distinct_safe_ids() {
        let graph = IssueGraph::new(
            vec![
                Node::new("a.b", "first", Status::Open),
                Node::new("ab", "second", Status::Open),
            ],
            vec![Edge::blocks("ab", "a.b")],
        );
        let out = render_mermaid(&graph, &MermaidOptions::default());
        let suffixed = format!("ab_{:08x}", crate::sanitize::fnv1a_32(b"ab"));
        assert!(out.contains("    ab[\"a.b<br/>first\"]"));
        assert!(out.contains(&format!("    {suffixed}[\"ab<br/>second\"]")));
        assert!(out.contains(&format!("    {suffixed} ==> ab\n")));
    }

    #[test]
    fn placeholder_only_when_requested_and_edgeless() {
        let graph = IssueGraph::new(vec![Node::new("A", "a", Status::Open)], vec![]);
        let with = MermaidOptions {
            no_dependencies_placeholder: true,
            ..Default::default()
        };
        assert!(render_mermaid(&graph, &with).contains("NoLinks[\"No Dependencies\"]"));
        assert!(!render_mermaid(&graph, &MermaidOptions::default()).contains("NoLinks"));
        assert!(!render_mermaid(&pair(), &with).contains("NoLinks"));
        assert!(!render_mermaid(&IssueGraph::default(), &with).contains("NoLinks"));
    }

    #[test]
    fn placeholder_does_not_redefine_issue_named_nolinks() {
        let graph = IssueGraph::new(vec![Node::new("NoLinks", "real issue", Status::Open)], vec![]);
        let options = MermaidOptions {
            no_dependencies_placeholder: true,
            ..Default::default()
        };
        let out = render_mermaid(&graph, &options);
        let reserved = format!("NoLinks_{:08x}", crate::sanitize::fnv1a_32(b"NoLinks"));
        assert!(out.contains("    NoLinks[\"NoLinks<br/>real issue\"]\n"));
        assert!(out.contains(&format!("    {reserved}[\"No Dependencies\"]\n")));
        assert!(!out.contains("    NoLinks[\"No Dependencies\"]"));
    }

    #[test]
    fn related_edges_use_dotted_arrow() {
        let mut graph = pair();
        graph.edges.push(Edge::related("bv-1", "bv-2"));
        let options = MermaidOptions {
            include_related: true,
            ..Default::default()
        };
        assert!(render_mermaid(&graph, &options).contains("    bv-1 -.-> bv-2\n"));
        assert!(!render_mermaid(&graph, &MermaidOptions::default()).contains("-.->"));
    }
}
