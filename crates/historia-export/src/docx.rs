use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Footer, Paragraph, Run, RunFonts, Style, StyleType};
use tracing::debug;

use crate::error::ExportError;
use crate::render::render_report;
use crate::report::{ReportDocument, DISCLAIMER, REPORT_TITLE};
use crate::styles::{DocumentStyles, Rgb8};

/// Render a report to DOCX through a Tera template (see
/// [`render_report`]).
pub fn generate_report_docx(
    report: &ReportDocument,
    template: Option<&str>,
    styles: &DocumentStyles,
) -> Result<Vec<u8>, ExportError> {
    let rendered = render_report(report, template)?;
    generate_docx(&rendered, styles)
}

/// Convert rendered report text to DOCX.
///
/// Line syntax: `# ` title, `## ` section heading, `**bold**` inline, blank
/// line as spacing, anything else a body paragraph. Every page carries the
/// disclaimer footer.
pub fn generate_docx(rendered: &str, styles: &DocumentStyles) -> Result<Vec<u8>, ExportError> {
    let footer_text = format!("Generated by {REPORT_TITLE} - {DISCLAIMER}");
    let footer = Footer::new().add_paragraph(
        Paragraph::new().align(AlignmentType::Center).add_run(
            Run::new()
                .add_text(footer_text)
                .size(styles.footer_size * 2)
                .color(Rgb8::MUTED.hex())
                .fonts(RunFonts::new().ascii(&styles.body_font)),
        ),
    );

    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "heading 1", styles.heading1_size))
        .add_style(heading_style("Heading2", "heading 2", styles.heading2_size))
        .footer(footer);

    for line in rendered.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            docx = docx.add_paragraph(Paragraph::new());
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading2", Rgb8::ACCENT, styles));
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading1", Rgb8::HEADER, styles));
        } else {
            docx = docx.add_paragraph(body_paragraph(trimmed, styles));
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    let bytes = buf.into_inner();
    debug!(bytes = bytes.len(), "report DOCX rendered");
    Ok(bytes)
}

fn heading_style(style_id: &str, name: &str, size_pt: usize) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2)
        .bold()
}

fn heading_paragraph(text: &str, style_id: &str, color: Rgb8, styles: &DocumentStyles) -> Paragraph {
    Paragraph::new().style(style_id).add_run(
        Run::new()
            .add_text(text)
            .color(color.hex())
            .fonts(RunFonts::new().ascii(&styles.heading_font)),
    )
}

fn body_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    parse_inline(text, styles)
        .into_iter()
        .fold(Paragraph::new().align(AlignmentType::Left), Paragraph::add_run)
}

/// Split `**bold**` segments into runs. An unclosed marker is kept as text.
fn parse_inline(text: &str, styles: &DocumentStyles) -> Vec<Run> {
    let plain = |s: &str| {
        Run::new()
            .add_text(s)
            .size(styles.body_size * 2)
            .fonts(RunFonts::new().ascii(&styles.body_font))
    };

    let mut runs = Vec::new();
    let mut remaining = text;
    while let Some(start) = remaining.find("**") {
        let after = &remaining[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            runs.push(plain(&remaining[..start]));
        }
        runs.push(plain(&after[..end]).bold());
        remaining = &after[end + 2..];
    }
    if !remaining.is_empty() {
        runs.push(plain(remaining));
    }
    runs
}
