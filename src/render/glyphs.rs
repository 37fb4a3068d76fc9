//! Text outlines for the raster backend.
//!
//! tiny-skia has no text support, so strings are turned into paths from the
//! glyph outlines of an embedded DejaVu Sans Mono face. Embedding keeps the
//! PNG text identical on every host, with or without system fonts.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use resvg::tiny_skia::{Path, PathBuilder};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

const FAMILY: &str = "DejaVu Sans Mono";
static REGULAR_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono-Bold.ttf");

static FONTS: Lazy<FontSet> = Lazy::new(FontSet::load);

struct FontData {
    data: Vec<u8>,
    index: u32,
}

struct FontSet {
    regular: Option<FontData>,
    bold: Option<FontData>,
}

impl FontSet {
    fn load() -> Self {
        let mut db = Database::new();
        db.load_font_data(REGULAR_TTF.to_vec());
        db.load_font_data(BOLD_TTF.to_vec());
        let regular = query_face(&db, Weight::NORMAL);
        let bold = query_face(&db, Weight::BOLD);
        if regular.is_none() && bold.is_none() {
            tracing::warn!(
                faces = db.len(),
                "embedded font failed to load; raster snapshots will have no text"
            );
        }
        Self { regular, bold }
    }

    fn face(&self, bold: bool) -> Option<&FontData> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }
}

fn query_face(db: &Database, weight: Weight) -> Option<FontData> {
    let families = [Family::Name(FAMILY), Family::Monospace];
    let query = Query {
        families: &families,
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| {
        Face::parse(data, index).ok()?;
        Some(FontData {
            data: data.to_vec(),
            index,
        })
    })?
}

/// Outline of `text` with its left baseline at `(x, baseline)`, or `None`
/// when the text has no visible glyphs.
pub(crate) fn text_path(text: &str, x: f32, baseline: f32, size: f32, bold: bool) -> Option<Path> {
    let font = FONTS.face(bold)?;
    let face = Face::parse(&font.data, font.index).ok()?;
    let scale = size / f32::from(face.units_per_em().max(1));
    let fallback = face.glyph_index('?');

    let mut pen = GlyphPen {
        builder: PathBuilder::new(),
        scale,
        origin_x: x,
        origin_y: baseline,
    };
    for ch in text.chars() {
        match face.glyph_index(ch).or(fallback) {
            Some(glyph) => {
                face.outline_glyph(glyph, &mut pen);
                pen.origin_x += advance(&face, glyph) * scale;
            }
            None => pen.origin_x += size * 0.5,
        }
    }
    pen.builder.finish()
}

fn advance(face: &Face<'_>, glyph: GlyphId) -> f32 {
    f32::from(face.glyph_hor_advance(glyph).unwrap_or(0))
}

/// Font units are y-up; the pixmap is y-down.
struct GlyphPen {
    builder: PathBuilder,
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl GlyphPen {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
