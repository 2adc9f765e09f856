//! A4 PDF export.
//!
//! [`layout`] is a pure pagination plan: every line of text with its page,
//! position, size, and style. [`generate_pdf`] draws that plan with
//! `printpdf` and stamps the footer on each page once the page count is
//! known.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb,
};
use tracing::debug;

use crate::error::ExportError;
use crate::report::{page_footer, ReportDocument};
use crate::styles::Rgb8;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;

/// Body text does not start below this line; the rest is footer space.
pub const CONTENT_BOTTOM_MM: f32 = PAGE_HEIGHT_MM - 40.0;
const FOOTER_FROM_TOP_MM: f32 = PAGE_HEIGHT_MM - 10.0;

const BODY_LINE_MM: f32 = 5.0;
const HEADING_GAP_MM: f32 = 7.0;
const SECTION_GAP_MM: f32 = 10.0;

/// Characters per wrapped body line at 10pt across the content width.
pub const WRAP_CHARS: usize = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Subtitle,
    PatientInfo,
    Heading,
    Body,
}

impl TextStyle {
    fn size(self) -> f32 {
        match self {
            TextStyle::Title => 22.0,
            TextStyle::Subtitle | TextStyle::Body => 10.0,
            TextStyle::PatientInfo => 11.0,
            TextStyle::Heading => 12.0,
        }
    }

    fn bold(self) -> bool {
        matches!(
            self,
            TextStyle::Title | TextStyle::PatientInfo | TextStyle::Heading
        )
    }

    fn color(self) -> Rgb8 {
        match self {
            TextStyle::Title | TextStyle::Subtitle => Rgb8::HEADER,
            TextStyle::Heading => Rgb8::ACCENT,
            TextStyle::PatientInfo | TextStyle::Body => Rgb8::INK,
        }
    }
}

/// One line of text on a page. `y_mm` is measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub pages: Vec<Vec<PlacedText>>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

struct Cursor {
    pages: Vec<Vec<PlacedText>>,
    y: f32,
}

impl Cursor {
    fn place(&mut self, text: impl Into<String>, x_mm: f32, style: TextStyle) {
        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedText {
                text: text.into(),
                x_mm,
                y_mm: self.y,
                style,
            });
        }
    }

    /// Start a new page if the cursor is past the content area.
    fn ensure_room(&mut self) {
        if self.y > CONTENT_BOTTOM_MM {
            self.pages.push(Vec::new());
            self.y = MARGIN_MM;
        }
    }
}

/// Greedy word wrap. Words longer than `max_chars` are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Plan every page of the report.
pub fn layout(report: &ReportDocument) -> PageLayout {
    let mut cursor = Cursor {
        pages: vec![Vec::new()],
        y: 25.0,
    };

    cursor.place(report.title, MARGIN_MM, TextStyle::Title);
    cursor.place(report.subtitle, PAGE_WIDTH_MM - MARGIN_MM - 45.0, TextStyle::Subtitle);

    cursor.y = 55.0;
    for line in [
        format!("Patient: {}", report.patient),
        format!("Age/Sex: {}", report.age_sex),
        format!("Date: {}", report.date),
    ] {
        cursor.place(line, MARGIN_MM, TextStyle::PatientInfo);
        cursor.y += 6.0;
    }
    cursor.y += 9.0;

    for section in &report.sections {
        cursor.ensure_room();
        cursor.place(section.title, MARGIN_MM, TextStyle::Heading);
        cursor.y += HEADING_GAP_MM;

        for source in &section.lines {
            let wrapped = wrap_text(source, WRAP_CHARS);
            if wrapped.is_empty() {
                cursor.y += BODY_LINE_MM;
                continue;
            }
            for line in wrapped {
                cursor.ensure_room();
                cursor.place(line, MARGIN_MM, TextStyle::Body);
                cursor.y += BODY_LINE_MM;
            }
        }
        cursor.y += SECTION_GAP_MM;
    }

    PageLayout {
        pages: cursor.pages,
    }
}

/// Render the report to PDF bytes.
pub fn generate_pdf(report: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let plan = layout(report);
    let total = plan.page_count();

    let (doc, first_page, first_layer) = PdfDocument::new(
        report.subtitle,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;

    for (index, page) in plan.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(p).get_layer(l)
        };

        for item in page {
            let font = if item.style.bold() { &bold } else { &regular };
            draw(&layer, &item.text, item.style.size(), item.x_mm, item.y_mm, item.style.color(), font);
        }

        draw(
            &layer,
            &page_footer(index + 1, total),
            8.0,
            MARGIN_MM,
            FOOTER_FROM_TOP_MM,
            Rgb8::MUTED,
            &regular,
        );
    }

    debug!(pages = total, "report PDF rendered");

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
}

fn draw(
    layer: &PdfLayerReference,
    text: &str,
    size: f32,
    x_mm: f32,
    y_from_top_mm: f32,
    color: Rgb8,
    font: &IndirectFontRef,
) {
    let Rgb8(r, g, b) = color;
    layer.set_fill_color(Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    )));
    layer.use_text(text, size, Mm(x_mm), Mm(PAGE_HEIGHT_MM - y_from_top_mm), font);
}
