use super::{Canvas, Rect, TextStyle, glyphs};
use crate::error::{RenderError, Result};
use crate::theme::Rgb;
use resvg::tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

// Cubic Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Raster backend drawing into a tiny-skia pixmap.
pub struct RasterCanvas {
    pixmap: Pixmap,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Encode(format!("cannot allocate {width}x{height} pixmap")))?;
        Ok(Self { pixmap })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|err| RenderError::Encode(err.to_string()))
    }

    fn fill(&mut self, path: &Path, color: Rgb) {
        self.pixmap.fill_path(
            path,
            &paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke(&mut self, path: &Path, color: Rgb, width: f64) {
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = true;
    paint
}

fn rounded_rect_path(rect: Rect, radius: f64) -> Option<Path> {
    let (x, y) = (rect.x as f32, rect.y as f32);
    let (w, h) = (rect.width as f32, rect.height as f32);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = (radius as f32).clamp(0.0, w.min(h) / 2.0);
    if r == 0.0 {
        return resvg::tiny_skia::Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }
    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

impl Canvas for RasterCanvas {
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb) {
        if let Some(path) = rounded_rect_path(rect, radius) {
            self.fill(&path, fill);
        }
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f64, stroke: Rgb, width: f64) {
        if let Some(path) = rounded_rect_path(rect, radius) {
            self.stroke(&path, stroke, width);
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, width: f64) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0 as f32, from.1 as f32);
        pb.line_to(to.0 as f32, to.1 as f32);
        if let Some(path) = pb.finish() {
            self.stroke(&path, color, width);
        }
    }

    fn polygon(&mut self, points: &[(f64, f64)], fill: Rgb) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.0 as f32, first.1 as f32);
        for (x, y) in rest {
            pb.line_to(*x as f32, *y as f32);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, fill);
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, style: &TextStyle) {
        if let Some(path) = glyphs::text_path(text, x as f32, y as f32, style.size, style.bold) {
            self.fill(&path, style.color);
        }
    }
}
