//! Fixed-page PDF rendering.
//!
//! Tables are laid out on A4 landscape pages with the built-in Helvetica
//! fonts. Every page repeats the title and the header row and ends with a
//! `Página N` footer. Rows that do not fit move to a new page.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::layout::{ReportTable, Target};
use crate::{Renderer, ReportError};

const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 10.0;
/// Title line plus the gap below it.
const TITLE_BLOCK_MM: f32 = 20.0;
/// Distance from the bottom edge reserved for the footer.
const FOOTER_MM: f32 = 15.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const ITALIC: &str = "F3";

const TITLE_SIZE: f32 = 12.0;
const HEADER_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 8.0;

/// Header row fill colour (RGB).
const HEADER_FILL: [u8; 3] = [200, 220, 255];

/// Renders report tables as paginated PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl Renderer for PdfRenderer {
    fn target(&self) -> Target {
        Target::Pdf
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError> {
        let per_page = rows_per_page(table.row_height_mm);
        let chunks: Vec<&[Vec<String>]> = if table.rows.is_empty() {
            vec![&table.rows[..]]
        } else {
            table.rows.chunks(per_page).collect()
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font = |base: &str| {
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Object::Name(base.as_bytes().to_vec()),
                "Encoding" => "WinAnsiEncoding",
            }
        };
        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));
        let italic_id = doc.add_object(font("Helvetica-Oblique"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular_id,
                BOLD => bold_id,
                ITALIC => italic_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(chunks.len());
        for (index, rows) in chunks.iter().enumerate() {
            let content = page_content(table, rows, index + 1);
            let encoded = content
                .encode()
                .map_err(|e| ReportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).map_err(|e| ReportError::Pdf(e.to_string()))?;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 842.into(), 595.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;

        log::debug!(
            "Rendered PDF '{}': {} rows on {} page(s)",
            table.title,
            table.rows.len(),
            chunks.len()
        );
        Ok(bytes)
    }
}

/// Number of body rows that fit on one page below the title and header
/// row. Always at least one.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn rows_per_page(row_height_mm: f32) -> usize {
    if row_height_mm <= 0.0 {
        return 1;
    }
    let available = PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BLOCK_MM - FOOTER_MM - row_height_mm;
    ((available / row_height_mm).floor() as usize).max(1)
}

/// Number of pages `rows` body rows take.
#[must_use]
pub fn page_count(rows: usize, row_height_mm: f32) -> usize {
    rows.div_ceil(rows_per_page(row_height_mm)).max(1)
}

fn page_content(table: &ReportTable, rows: &[Vec<String>], page_number: usize) -> Content {
    let mut ops = Vec::new();
    let widths = table.column_widths();
    let table_width: f32 = widths.iter().sum();
    let row_height = table.row_height_mm;

    let mut y = MARGIN_MM;
    centered_text(
        &mut ops,
        BOLD,
        TITLE_SIZE,
        &table.title,
        MARGIN_MM,
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM,
        y,
        10.0,
    );
    y += TITLE_BLOCK_MM;

    set_fill(&mut ops, HEADER_FILL);
    let mut x = MARGIN_MM;
    for &width in &widths {
        cell_border(&mut ops, x, y, width, row_height, true);
        x += width;
    }
    set_fill(&mut ops, [0, 0, 0]);
    let mut x = MARGIN_MM;
    for (header, &width) in table.headers.iter().zip(&widths) {
        centered_text(&mut ops, BOLD, HEADER_SIZE, header, x, width, y, row_height);
        x += width;
    }
    y += row_height;

    for row in rows {
        let font = if table.is_marker_row(row) { BOLD } else { REGULAR };
        let mut x = MARGIN_MM;
        for (cell, &width) in row.iter().zip(&widths) {
            cell_border(&mut ops, x, y, width, row_height, false);
            centered_text(&mut ops, font, BODY_SIZE, cell, x, width, y, row_height);
            x += width;
        }
        y += row_height;
    }

    let footer = format!("Página {page_number}");
    centered_text(
        &mut ops,
        ITALIC,
        FOOTER_SIZE,
        &footer,
        MARGIN_MM,
        table_width.max(PAGE_WIDTH_MM - 2.0 * MARGIN_MM),
        PAGE_HEIGHT_MM - FOOTER_MM,
        10.0,
    );

    Content { operations: ops }
}

fn set_fill(ops: &mut Vec<Operation>, [r, g, b]: [u8; 3]) {
    let channel = |c: u8| Object::Real(f32::from(c) / 255.0);
    ops.push(Operation::new("rg", vec![channel(r), channel(g), channel(b)]));
}

/// Draws a cell outline whose top-left corner is at (`x`, `y`) millimetres
/// from the top-left of the page.
fn cell_border(ops: &mut Vec<Operation>, x: f32, y: f32, width: f32, height: f32, fill: bool) {
    ops.push(Operation::new(
        "re",
        vec![
            pt(x).into(),
            pt(PAGE_HEIGHT_MM - y - height).into(),
            pt(width).into(),
            pt(height).into(),
        ],
    ));
    ops.push(Operation::new(if fill { "B" } else { "S" }, vec![]));
}

/// Writes `text` horizontally centred in the box starting at `x` and
/// vertically centred in the line of `height` starting at `y`.
#[allow(clippy::too_many_arguments)]
fn centered_text(
    ops: &mut Vec<Operation>,
    font: &str,
    size: f32,
    text: &str,
    x: f32,
    width: f32,
    y: f32,
    height: f32,
) {
    if text.is_empty() {
        return;
    }
    let text_width = estimated_width_pt(text, size);
    let left = pt(x) + (pt(width) - text_width).max(0.0) / 2.0;
    let baseline = pt(PAGE_HEIGHT_MM - y - height / 2.0) - size * 0.35;

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![left.into(), baseline.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Average Helvetica glyph width is roughly half the font size.
#[allow(clippy::cast_precision_loss)]
fn estimated_width_pt(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Encodes `text` for the standard fonts. Latin-1 characters map to
/// themselves; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ReportKind;
    use paystub_models::{AggregateRow, EnrichedRecord, Identity, LedgerRow, MarkerLabel};

    fn rows(n: usize) -> Vec<LedgerRow> {
        (0..n)
            .map(|i| {
                LedgerRow::Record(EnrichedRecord {
                    code: "216".to_owned(),
                    description: format!("CONSIGNAÇÃO {i}"),
                    raw_amount: "10,00".to_owned(),
                    page: u32::try_from(i).unwrap() + 1,
                    segment: 1,
                    period: None,
                })
            })
            .collect()
    }

    fn render(kind: ReportKind, n: usize) -> Vec<u8> {
        let table = ReportTable::build(kind, &Identity::default(), &rows(n), Target::Pdf);
        PdfRenderer.render(&table).unwrap()
    }

    /// Font resource selected when `text` is first drawn.
    fn font_for(content: &Content, text: &str) -> Option<Vec<u8>> {
        let encoded = win_ansi(text);
        let mut font = None;
        for op in &content.operations {
            match (op.operator.as_str(), op.operands.first()) {
                ("Tf", Some(Object::Name(name))) => font = Some(name.clone()),
                ("Tj", Some(Object::String(bytes, _))) if *bytes == encoded => return font,
                _ => {}
            }
        }
        None
    }

    #[test]
    fn marker_rows_use_the_bold_font() {
        let mut ledger = rows(1);
        ledger.push(LedgerRow::Marker(AggregateRow {
            label: MarkerLabel::Total,
            amount: "10.00".to_owned(),
        }));
        let table = ReportTable::build(
            ReportKind::FinalDeductions,
            &Identity::default(),
            &ledger,
            Target::Pdf,
        );

        let content = page_content(&table, &table.rows, 1);
        assert_eq!(
            font_for(&content, "CONSIGNAÇÃO 0").as_deref(),
            Some(REGULAR.as_bytes())
        );
        assert_eq!(
            font_for(&content, "Valor Total (R$)").as_deref(),
            Some(BOLD.as_bytes())
        );
        assert_eq!(font_for(&content, "Página 1").as_deref(), Some(ITALIC.as_bytes()));
    }

    #[test]
    fn computes_rows_per_page() {
        assert_eq!(rows_per_page(10.0), 15);
        assert_eq!(rows_per_page(8.0), 19);
        assert_eq!(rows_per_page(500.0), 1);
        assert_eq!(rows_per_page(0.0), 1);
    }

    #[test]
    fn counts_pages() {
        assert_eq!(page_count(0, 10.0), 1);
        assert_eq!(page_count(15, 10.0), 1);
        assert_eq!(page_count(16, 10.0), 2);
        assert_eq!(page_count(40, 8.0), 3);
    }

    #[test]
    fn renders_loadable_pdf() {
        let bytes = render(ReportKind::Extraction, 3);
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn paginates_long_tables() {
        let bytes = render(ReportKind::Extraction, 31);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), page_count(31, 10.0));
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn empty_table_still_has_one_page() {
        let bytes = render(ReportKind::FinalDeductions, 0);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn encodes_latin1_and_replaces_the_rest() {
        assert_eq!(win_ansi("Página"), b"P\xe1gina".to_vec());
        assert_eq!(win_ansi("R€"), b"R?".to_vec());
    }
}
