use crate::model::Status;

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RRGGBB`, upper-case.
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

pub const STATUS_OPEN: Rgb = Rgb(0xC8, 0xE6, 0xC9);
pub const STATUS_IN_PROGRESS: Rgb = Rgb(0xBB, 0xDE, 0xFB);
pub const STATUS_BLOCKED: Rgb = Rgb(0xFF, 0xCD, 0xD2);
pub const STATUS_CLOSED: Rgb = Rgb(0xCF, 0xD8, 0xDC);

/// Fill color for a status, shared by DOT, Mermaid and both snapshot backends.
pub fn status_fill(status: Status) -> Rgb {
    match status {
        Status::Open => STATUS_OPEN,
        Status::InProgress => STATUS_IN_PROGRESS,
        Status::Blocked => STATUS_BLOCKED,
        Status::Closed | Status::Tombstone => STATUS_CLOSED,
    }
}

/// Colors and type sizes for snapshot images.
#[derive(Debug, Clone)]
pub struct Theme {
    pub font_family: String,
    pub backdrop: Rgb,
    pub header_background: Rgb,
    pub legend_background: Rgb,
    pub stroke: Rgb,
    pub edge: Rgb,
    pub text: Rgb,
    pub subtle_text: Rgb,
    pub title_size: f32,
    pub body_size: f32,
    pub label_size: f32,
    pub small_size: f32,
}

impl Theme {
    pub fn snapshot() -> Self {
        Self {
            font_family: "monospace".to_string(),
            backdrop: Rgb(0xF9, 0xFA, 0xFB),
            header_background: Rgb(0xF3, 0xF4, 0xF6),
            legend_background: Rgb(0xEE, 0xEE, 0xEE),
            stroke: Rgb(0x22, 0x22, 0x22),
            edge: Rgb(0x6B, 0x80, 0xBF),
            text: Rgb(0x11, 0x11, 0x11),
            subtle_text: Rgb(0x66, 0x66, 0x66),
            title_size: 16.0,
            body_size: 13.0,
            label_size: 12.0,
            small_size: 11.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::snapshot()
    }
}
