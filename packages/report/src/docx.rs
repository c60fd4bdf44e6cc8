//! Flowing-table DOCX rendering.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, PageOrientationType, Paragraph, Run, Table, TableCell, TableRow,
    WidthType,
};

use crate::layout::{ReportTable, Target};
use crate::{Renderer, ReportError};

/// A4 landscape, in twentieths of a point.
const PAGE_WIDTH_TWIPS: u32 = 16_838;
const PAGE_HEIGHT_TWIPS: u32 = 11_906;

/// Font sizes in half-points.
const HEADING_SIZE: usize = 28;
const BODY_SIZE: usize = 18;
const MARKER_SIZE: usize = 22;

const MARKER_COLOR: &str = "FF0000";

const EMPTY_MESSAGE: &str = "Nenhum dado para exibir.";

/// Renders report tables as DOCX documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn target(&self) -> Target {
        Target::Docx
    }

    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError> {
        let heading = Paragraph::new()
            .add_run(Run::new().add_text(&table.title).bold().size(HEADING_SIZE))
            .align(AlignmentType::Center);

        let mut docx = Docx::new()
            .page_size(PAGE_WIDTH_TWIPS, PAGE_HEIGHT_TWIPS)
            .page_orient(PageOrientationType::Landscape)
            .add_paragraph(heading);

        docx = if table.is_empty() {
            docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(EMPTY_MESSAGE))
                    .align(AlignmentType::Center),
            )
        } else {
            docx.add_table(build_table(table))
        };

        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|e| ReportError::Docx(e.to_string()))?;

        log::debug!(
            "Rendered DOCX '{}': {} rows",
            table.title,
            table.rows.len()
        );
        Ok(cursor.into_inner())
    }
}

fn build_table(table: &ReportTable) -> Table {
    let widths: Vec<usize> = table.column_widths().into_iter().map(mm_to_twips).collect();

    let header = TableRow::new(
        table
            .headers
            .iter()
            .zip(&widths)
            .map(|(label, &width)| {
                cell(
                    Run::new().add_text(label).bold().size(BODY_SIZE),
                    AlignmentType::Center,
                    width,
                )
            })
            .collect(),
    );

    let body = table.rows.iter().map(|row| {
        let marker = table.is_marker_row(row);
        TableRow::new(
            row.iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (text, &width))| {
                    let run = Run::new().add_text(text);
                    let run = if marker {
                        run.bold().size(MARKER_SIZE).color(MARKER_COLOR)
                    } else {
                        run.size(BODY_SIZE)
                    };
                    let align = if table.description_column == Some(i) {
                        AlignmentType::Left
                    } else {
                        AlignmentType::Center
                    };
                    cell(run, align, width)
                })
                .collect(),
        )
    });

    Table::new(std::iter::once(header).chain(body).collect()).set_grid(widths)
}

fn cell(run: Run, align: AlignmentType, width: usize) -> TableCell {
    TableCell::new()
        .add_paragraph(Paragraph::new().add_run(run).align(align))
        .width(width, WidthType::Dxa)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mm_to_twips(mm: f32) -> usize {
    (mm * 1440.0 / 25.4).round() as usize
}
