#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular reports for deduction ledgers.
//!
//! Ledger rows are first rendered to text through a [`layout::ReportKind`]
//! into a [`ReportTable`]; a [`Renderer`] then turns the table into the
//! bytes of a PDF or DOCX file.

pub mod docx;
pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

pub use docx::DocxRenderer;
pub use layout::{ReportKind, ReportTable, Target};
pub use pdf::PdfRenderer;

/// Errors that can occur while rendering or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Writing the report file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building or serializing the PDF document failed.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Packing the DOCX archive failed.
    #[error("DOCX error: {0}")]
    Docx(String),
}

/// Turns a [`ReportTable`] into the bytes of one output format.
pub trait Renderer {
    /// Output format produced by this renderer.
    fn target(&self) -> Target;

    /// Renders `table` into a complete file image.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the document cannot be serialized.
    fn render(&self, table: &ReportTable) -> Result<Vec<u8>, ReportError>;
}

/// Renders `table` with `renderer` and writes it to `dir/file_name`,
/// creating `dir` if needed. Existing files are overwritten.
///
/// # Errors
///
/// Returns [`ReportError`] if rendering fails or the file cannot be
/// written.
pub fn write_report(
    renderer: &dyn Renderer,
    table: &ReportTable,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ReportError> {
    let bytes = renderer.render(table)?;
    std::fs::create_dir_all(dir)?;

    let path = dir.join(file_name);
    std::fs::write(&path, &bytes)?;

    log::info!(
        "Wrote {} report '{}' ({} rows, {} bytes)",
        renderer.target(),
        path.display(),
        table.rows.len(),
        bytes.len()
    );
    Ok(path)
}

/// Returns the renderer for `target`.
#[must_use]
pub fn renderer_for(target: Target) -> Box<dyn Renderer> {
    match target {
        Target::Pdf => Box::new(PdfRenderer),
        Target::Docx => Box::new(DocxRenderer),
    }
}
