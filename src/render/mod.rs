//! Snapshot renderer.
//!
//! [`draw_snapshot`] issues one fixed sequence of drawing commands against a
//! [`Canvas`]. The SVG and PNG backends both implement the trait, so they
//! draw the same shapes in the same order and differ only in encoding.

#[cfg(feature = "png")]
mod glyphs;
#[cfg(feature = "png")]
mod raster;
mod svg;

#[cfg(feature = "png")]
pub use raster::RasterCanvas;
pub use svg::SvgCanvas;

use crate::error::Result;
use crate::layout::{LayoutNode, LayoutResult};
use crate::model::Status;
use crate::sanitize::{LabelTarget, sanitize_label};
use crate::theme::{Rgb, Theme, status_fill};
use std::collections::HashMap;

const NODE_RADIUS: f64 = 8.0;
const NODE_STROKE_WIDTH: f64 = 1.2;
const EDGE_WIDTH: f64 = 2.0;
const ARROW_LENGTH: f64 = 8.0;
const ARROW_HALF_WIDTH: f64 = 4.0;
const LEGEND_WIDTH: f64 = 180.0;
const LEGEND_HEIGHT: f64 = 96.0;
const NODE_TITLE_MAX_RUNES: usize = 44;
const SUMMARY_MAX_RUNES: usize = 80;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
}

/// Drawing surface shared by the snapshot backends.
///
/// Text is anchored at its left edge on the baseline and arrives
/// normalized but unescaped; each backend applies its own escaping.
pub trait Canvas {
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb);
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, stroke: Rgb, width: f64);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, width: f64);
    fn polygon(&mut self, points: &[(f64, f64)], fill: Rgb);
    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Svg,
    Png,
}

/// Draw the whole snapshot onto `canvas`.
pub fn draw_snapshot(canvas: &mut dyn Canvas, layout: &LayoutResult, theme: &Theme) {
    let width = f64::from(layout.canvas_width);
    let height = f64::from(layout.canvas_height);

    canvas.fill_rounded_rect(Rect::new(0.0, 0.0, width, height), 0.0, theme.backdrop);
    canvas.fill_rounded_rect(
        Rect::new(16.0, 16.0, width - 32.0, layout.header_height - 24.0),
        10.0,
        theme.header_background,
    );

    draw_summary(canvas, layout, theme);
    draw_legend(canvas, width - 200.0, 24.0, theme);
    draw_edges(canvas, layout, theme);
    draw_nodes(canvas, layout, theme);
}

fn draw_summary(canvas: &mut dyn Canvas, layout: &LayoutResult, theme: &Theme) {
    let summary = &layout.summary;
    let subtle = TextStyle {
        size: theme.body_size,
        bold: false,
        color: theme.subtle_text,
    };
    canvas.text(
        32.0,
        44.0,
        &plain(&summary.title, SUMMARY_MAX_RUNES),
        &TextStyle {
            size: theme.title_size,
            bold: true,
            color: theme.text,
        },
    );
    canvas.text(
        32.0,
        64.0,
        &plain(&format!("data_hash: {}", summary.data_hash), SUMMARY_MAX_RUNES),
        &subtle,
    );
    let mut counts = format!("nodes: {}  edges: {}", summary.node_count, summary.edge_count);
    if summary.cycle_count > 0 {
        counts.push_str(&format!("  cycles: {}", summary.cycle_count));
    }
    canvas.text(32.0, 84.0, &counts, &subtle);
    canvas.text(
        32.0,
        104.0,
        &plain(
            &format!("top bottleneck: {}", summary.top_bottleneck),
            SUMMARY_MAX_RUNES,
        ),
        &subtle,
    );
}

fn draw_legend(canvas: &mut dyn Canvas, x: f64, y: f64, theme: &Theme) {
    let frame = Rect::new(x, y, LEGEND_WIDTH, LEGEND_HEIGHT);
    canvas.fill_rounded_rect(frame, 10.0, theme.legend_background);
    canvas.stroke_rounded_rect(frame, 10.0, theme.stroke, 1.0);
    canvas.text(
        x + 12.0,
        y + 18.0,
        "Legend",
        &TextStyle {
            size: theme.body_size,
            bold: true,
            color: theme.text,
        },
    );

    let rows = [
        (Status::Open, "Open / Ready"),
        (Status::InProgress, "In Progress"),
        (Status::Blocked, "Blocked"),
        (Status::Closed, "Closed"),
    ];
    let label_style = TextStyle {
        size: theme.label_size,
        bold: false,
        color: theme.subtle_text,
    };
    for (idx, (status, label)) in rows.into_iter().enumerate() {
        let row_x = x + 12.0;
        let row_y = y + 36.0 + idx as f64 * 16.0;
        let swatch = Rect::new(row_x, row_y - 8.0, 14.0, 14.0);
        canvas.fill_rounded_rect(swatch, 3.0, status_fill(status));
        canvas.stroke_rounded_rect(swatch, 3.0, theme.stroke, 1.0);
        canvas.text(row_x + 20.0, row_y, label, &label_style);
    }
}

fn draw_edges(canvas: &mut dyn Canvas, layout: &LayoutResult, theme: &Theme) {
    let by_id: HashMap<&str, &LayoutNode> =
        layout.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    for edge in &layout.edges {
        let (Some(from), Some(to)) = (by_id.get(edge.from.as_str()), by_id.get(edge.to.as_str()))
        else {
            continue;
        };
        let start = from.right_anchor();
        let (x2, y2) = to.left_anchor();
        canvas.line(start, (x2, y2), theme.edge, EDGE_WIDTH);
        canvas.polygon(
            &[
                (x2, y2),
                (x2 + ARROW_LENGTH, y2 + ARROW_HALF_WIDTH),
                (x2 + ARROW_LENGTH, y2 - ARROW_HALF_WIDTH),
            ],
            theme.edge,
        );
    }
}

fn draw_nodes(canvas: &mut dyn Canvas, layout: &LayoutResult, theme: &Theme) {
    for node in &layout.nodes {
        let rect = Rect::new(node.x, node.y, node.width, node.height);
        canvas.fill_rounded_rect(rect, NODE_RADIUS, status_fill(node.status));
        canvas.stroke_rounded_rect(rect, NODE_RADIUS, theme.stroke, NODE_STROKE_WIDTH);
        canvas.text(
            node.x + 10.0,
            node.y + 22.0,
            &plain(&node.id, usize::MAX),
            &TextStyle {
                size: theme.body_size,
                bold: true,
                color: theme.text,
            },
        );
        canvas.text(
            node.x + 10.0,
            node.y + 42.0,
            &plain(&node.title, NODE_TITLE_MAX_RUNES),
            &TextStyle {
                size: theme.label_size,
                bold: false,
                color: theme.subtle_text,
            },
        );
        canvas.text(
            node.x + 10.0,
            node.y + 60.0,
            &format!("PR {:.3}", node.page_rank),
            &TextStyle {
                size: theme.small_size,
                bold: false,
                color: theme.subtle_text,
            },
        );
    }
}

fn plain(text: &str, max_runes: usize) -> String {
    sanitize_label(text, max_runes, LabelTarget::Plain)
}

/// Encode `layout` as SVG or PNG bytes.
pub fn render_snapshot(layout: &LayoutResult, format: SnapshotFormat) -> Result<Vec<u8>> {
    let theme = Theme::snapshot();
    tracing::debug!(
        ?format,
        width = layout.canvas_width,
        height = layout.canvas_height,
        nodes = layout.nodes.len(),
        "rendering snapshot"
    );
    match format {
        SnapshotFormat::Svg => {
            let mut canvas = SvgCanvas::new(layout.canvas_width, layout.canvas_height, &theme);
            draw_snapshot(&mut canvas, layout, &theme);
            Ok(canvas.finish().into_bytes())
        }
        SnapshotFormat::Png => render_png(layout, &theme),
    }
}

#[cfg(feature = "png")]
fn render_png(layout: &LayoutResult, theme: &Theme) -> Result<Vec<u8>> {
    let mut canvas = RasterCanvas::new(layout.canvas_width, layout.canvas_height)?;
    draw_snapshot(&mut canvas, layout, theme);
    canvas.encode_png()
}

#[cfg(not(feature = "png"))]
fn render_png(_layout: &LayoutResult, _theme: &Theme) -> Result<Vec<u8>> {
    Err(crate::error::RenderError::UnsupportedFormat(
        "png (built without the `png` feature)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutOptions, compute_layout};
    use crate::metrics::GraphMetrics;
    use crate::model::{Edge, IssueGraph, Node};

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl Canvas for Recorder {
        fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb) {
            self.ops.push(format!("fill {} {} r{radius} {}", rect.x, rect.y, fill.hex()));
        }
        fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, stroke: Rgb, width: f64) {
            self.ops.push(format!("stroke {} {} r{radius} {} {width}", rect.x, rect.y, stroke.hex()));
        }
        fn line(&mut self, from: (f64, f64), to: (f64, f64), _color: Rgb, _width: f64) {
            self.ops.push(format!("line {from:?} {to:?}"));
        }
        fn polygon(&mut self, points: &[(f64, f64)], _fill: Rgb) {
            self.ops.push(format!("polygon {}", points.len()));
        }
        fn text(&mut self, _x: f64, _y: f64, text: &str, _style: &TextStyle) {
            self.ops.push(format!("text {text}"));
        }
    }

    fn layout() -> LayoutResult {
        let graph = IssueGraph::new(
            vec![
                Node::new("A", "Root task", Status::Open),
                Node::new("B", "Line\nbreak", Status::Blocked),
            ],
            vec![Edge::blocks("B", "A")],
        );
        let metrics = GraphMetrics::new()
            .with_page_rank("A", 0.6)
            .with_critical_path("A", 1.0)
            .with_critical_path("B", 2.0)
            .with_betweenness("A", 1.5);
        compute_layout(&graph, &metrics, &LayoutOptions::default()).unwrap()
    }

    #[test]
    fn draws_in_fixed_order() {
        let mut recorder = Recorder::default();
        draw_snapshot(&mut recorder, &layout(), &Theme::snapshot());
        let ops = &recorder.ops;
        assert!(ops[0].starts_with("fill 0 0 r0 #F9FAFB"));
        assert!(ops[1].starts_with("fill 16 16 r10 #F3F4F6"));
        assert_eq!(ops[2], "text Graph Snapshot");
        assert_eq!(ops[3], "text data_hash:");
        assert_eq!(ops[4], "text nodes: 2  edges: 1");
        assert_eq!(ops[5], "text top bottleneck: A (1.50)");
        assert!(ops[6].starts_with("fill") && ops[6].ends_with("#EEEEEE"));
        assert_eq!(ops[8], "text Legend");
        let line = ops.iter().position(|op| op.starts_with("line")).unwrap();
        let last_legend = ops.iter().rposition(|op| op == "text Closed").unwrap();
        assert!(line > last_legend);
        assert_eq!(ops[line + 1], "polygon 3");
        assert!(ops.contains(&"text Line break".to_string()));
        assert!(ops.contains(&"text PR 0.600".to_string()));
        assert_eq!(ops.last().unwrap(), "text PR 0.000");
    }

    #[test]
    fn svg_snapshot_is_deterministic() {
        let layout = layout();
        let first = render_snapshot(&layout, SnapshotFormat::Svg).unwrap();
        let second = render_snapshot(&layout, SnapshotFormat::Svg).unwrap();
        assert_eq!(first, second);
    }
}
