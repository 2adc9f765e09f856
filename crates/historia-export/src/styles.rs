use serde::{Deserialize, Serialize};

/// Fonts and sizes for DOCX exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    pub body_font: String,
    pub heading_font: String,

    /// Sizes in points.
    pub body_size: usize,
    pub heading1_size: usize,
    pub heading2_size: usize,
    pub footer_size: usize,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Arial".to_string(),
            body_size: 10,
            heading1_size: 22,
            heading2_size: 12,
            footer_size: 8,
        }
    }
}

/// An RGB colour, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const INK: Rgb8 = Rgb8(0, 0, 0);
    pub const HEADER: Rgb8 = Rgb8(17, 24, 39);
    pub const ACCENT: Rgb8 = Rgb8(59, 130, 246);
    pub const MUTED: Rgb8 = Rgb8(150, 150, 150);

    /// Hex form used by DOCX runs, e.g. `3B82F6`.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}
