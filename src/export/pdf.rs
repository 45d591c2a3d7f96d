#![forbid(unsafe_code)]

use std::io::{self, Write as _};

use crate::task::store::Snapshot;
use crate::tui::view;

/// A4 portrait, in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 20.0;
const MAX_FONT_SIZE: f32 = 11.0;
/// Courier advance width relative to the font size.
const GLYPH_WIDTH: f32 = 0.6;
const LINE_SPACING: f32 = 1.2;

/// Columns the list is laid out in before it is placed on the page.
pub const SNAPSHOT_COLUMNS: u16 = 96;

/// Renders the snapshot through the list widget and writes it as a
/// single-page PDF.
pub fn write_pdf(snapshot: &Snapshot, mut out: impl io::Write) -> anyhow::Result<()> {
    let lines = view::render_snapshot(snapshot, SNAPSHOT_COLUMNS);
    out.write_all(&render_page(&lines))?;
    Ok(())
}

/// Lays `lines` out on one page in a monospace font, scaled down so the
/// widest line and all rows fit inside the margins.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_page(lines: &[String]) -> Vec<u8> {
    let cols = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(1)
        .max(1);
    let rows = lines.len().max(1);
    let usable_w = PAGE_WIDTH - 2.0 * MARGIN;
    let usable_h = PAGE_HEIGHT - 2.0 * MARGIN;
    let size = (usable_w / (cols as f32 * GLYPH_WIDTH))
        .min(usable_h / (rows as f32 * LINE_SPACING))
        .min(MAX_FONT_SIZE);
    let leading = size * LINE_SPACING;

    let mut content: Vec<u8> = Vec::new();
    let _ = write!(
        content,
        "BT\n/F1 {size:.2} Tf\n{leading:.2} TL\n{MARGIN:.2} {top:.2} Td\n",
        top = PAGE_HEIGHT - MARGIN - size
    );
    for line in lines {
        content.push(b'(');
        content.extend(encode_text(line));
        content.extend_from_slice(b") Tj T*\n");
    }
    content.extend_from_slice(b"ET\n");

    let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
    stream.extend_from_slice(&content);
    stream.extend_from_slice(b"endstream");

    let objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        stream,
    ];

    let mut pdf: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = writeln!(pdf, "{} 0 obj", i + 1);
        pdf.extend_from_slice(body);
        pdf.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = pdf.len();
    let _ = writeln!(pdf, "xref\n0 {}\n0000000000 65535 f ", objects.len() + 1);
    for off in offsets {
        let _ = writeln!(pdf, "{off:010} 00000 n ");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    pdf
}

/// Escapes a line for a PDF string literal. Box-drawing glyphs become ASCII
/// and anything outside Latin-1 becomes `?`.
fn encode_text(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    for c in line.chars() {
        let c = match c {
            '─' | '━' | '═' => '-',
            '│' | '┃' | '║' => '|',
            '┌' | '┐' | '└' | '┘' | '├' | '┤' | '┬' | '┴' | '┼' | '╭' | '╮' | '╯' | '╰' => '+',
            '▸' | '›' => '>',
            other => other,
        };
        match c {
            '\\' | '(' | ')' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 0x20 => {}
            c if (c as u32) < 0x7F => out.push(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => {
                out.push(u8::try_from(c as u32).unwrap_or(b'?'));
            }
            _ => out.push(b'?'),
        }
    }
    out
}
