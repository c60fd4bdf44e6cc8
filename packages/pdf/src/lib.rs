#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-page PDF text extraction for payslip statements.
//!
//! Statements arrive as PDF files. This crate turns one into an ordered
//! list of [`PageText`] values using pure-Rust text extraction
//! ([`pdf_extract`]). Each page is extracted on its own. A page whose
//! content cannot be decoded (a missing font, a broken content stream)
//! yields empty text and extraction carries on with the next one,
//! so page numbering stays aligned with the source document.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use paystub_models::PageText;
use pdf_extract::{Document, OutputError, PlainTextOutput};

/// Errors specific to PDF text extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The document itself could not be loaded.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the PDF at `path` and extracts the text of every page.
///
/// # Errors
///
/// Returns [`PdfError::Io`] if the file cannot be read and
/// [`PdfError::Extraction`] if the document cannot be parsed.
pub fn extract_pages(path: &Path) -> Result<Vec<PageText>, PdfError> {
    let bytes = std::fs::read(path)?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    extract_pages_from_mem(&bytes)
}

/// Extracts the text of every page of an in-memory PDF.
///
/// Failures on individual pages are logged and produce blank pages.
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the document cannot be loaded or
/// decrypted.
pub fn extract_pages_from_mem(bytes: &[u8]) -> Result<Vec<PageText>, PdfError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| PdfError::Extraction(format!("failed to load PDF: {e}")))?;
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| PdfError::Extraction(format!("failed to decrypt PDF: {e}")))?;
    }

    let pages: Vec<PageText> = doc
        .get_pages()
        .into_keys()
        .map(|number| PageText::new(number, page_text(&doc, number)))
        .collect();

    let blank = pages.iter().filter(|page| page.is_blank()).count();
    log::info!(
        "Extracted text from {} page(s) ({blank} without text)",
        pages.len()
    );

    Ok(pages)
}

/// Extracts one page, falling back to empty text when the page errors or
/// the decoder panics on it.
fn page_text(doc: &Document, number: u32) -> String {
    let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String, OutputError> {
        let mut text = String::new();
        let mut output = PlainTextOutput::new(&mut text);
        pdf_extract::output_doc_page(doc, &mut output, number)?;
        drop(output);
        Ok(text)
    }));

    match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            log::warn!("Page {number}: text extraction failed, treating as blank: {e}");
            String::new()
        }
        Err(_) => {
            log::warn!("Page {number}: text extraction aborted, treating as blank");
            String::new()
        }
    }
}
