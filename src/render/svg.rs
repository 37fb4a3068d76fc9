use super::{Canvas, Rect, TextStyle};
use crate::sanitize::{LabelTarget, escape_xml, sanitize_label};
use crate::theme::{Rgb, Theme};

/// Vector backend: accumulates SVG elements into a string.
pub struct SvgCanvas {
    svg: String,
    font_family: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32, theme: &Theme) -> Self {
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n",
        ));
        Self {
            svg,
            font_family: escape_xml(&theme.font_family),
        }
    }

    /// Close the root element and return the document.
    pub fn finish(mut self) -> String {
        self.svg.push_str("</svg>\n");
        self.svg
    }
}

impl Canvas for SvgCanvas {
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb) {
        self.svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{}\"/>\n",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            fill.hex()
        ));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, stroke: Rgb, width: f64) {
        self.svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width:.2}\"/>\n",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            stroke.hex()
        ));
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, width: f64) {
        self.svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width:.2}\"/>\n",
            from.0,
            from.1,
            to.0,
            to.1,
            color.hex()
        ));
    }

    fn polygon(&mut self, points: &[(f64, f64)], fill: Rgb) {
        let points = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.svg.push_str(&format!(
            "<polygon points=\"{points}\" fill=\"{}\"/>\n",
            fill.hex()
        ));
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        let weight = if style.bold { " font-weight=\"bold\"" } else { "" };
        self.svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\"{weight} fill=\"{}\">{}</text>\n",
            self.font_family,
            style.size,
            style.color.hex(),
            sanitize_label(text, usize::MAX, LabelTarget::Svg)
        ));
    }
}
