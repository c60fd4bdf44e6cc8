#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The working set of one statement review.
//!
//! A [`Session`] owns everything the user builds up while reviewing a
//! statement: the glossary, the extracted statement, the last glossary
//! match, the manual selection narrowed from it and the amount already
//! received. Each stage reads from and writes to the session explicitly;
//! nothing is kept in process-wide state.

pub mod config;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use paystub_extract::Statement;
use paystub_extract::progress::ProgressCallback;
use paystub_glossary::Glossary;
use paystub_glossary::matcher::{MatchOutcome, Threshold, match_records};
use paystub_ledger::{OperandB, build_ledger, sort_chronologically};
use paystub_models::{EnrichedRecord, Identity, LedgerRow, PageText};
use paystub_report::{ReportKind, ReportTable, Target, renderer_for, write_report};

pub use config::{AppConfig, ConfigError};

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The statement PDF could not be read.
    #[error(transparent)]
    Pdf(#[from] paystub_pdf::PdfError),

    /// A report could not be rendered or written.
    #[error(transparent)]
    Report(#[from] paystub_report::ReportError),

    /// The final report was requested with no records to report on.
    #[error("No deductions selected for the final report")]
    EmptySelection,
}

/// A unique description in the current working set and how many records
/// carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionCount {
    /// 1-based position in the alphabetical listing.
    pub index: usize,
    /// The description.
    pub description: String,
    /// Number of records with this description.
    pub count: usize,
}

impl DescriptionCount {
    /// Label shown in the selection list, e.g. `1 - INSS (Qtd: 3)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {} (Qtd: {})", self.index, self.description, self.count)
    }
}

/// Session-scoped working set for one statement.
#[derive(Debug, Default)]
pub struct Session {
    glossary: Glossary,
    statement: Statement,
    outcome: Option<MatchOutcome>,
    selection: Option<Vec<EnrichedRecord>>,
    operand_b: Option<OperandB>,
}

impl Session {
    /// Starts a session with the given glossary.
    #[must_use]
    pub fn new(glossary: Glossary) -> Self {
        Self {
            glossary,
            ..Self::default()
        }
    }

    /// Glossary in use.
    #[must_use]
    pub const fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// The extracted statement.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Beneficiary identity of the loaded statement.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.statement.identity
    }

    /// Result of the last glossary match, if one was run.
    #[must_use]
    pub const fn match_outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Amount already received, if supplied.
    #[must_use]
    pub const fn operand_b(&self) -> Option<&OperandB> {
        self.operand_b.as_ref()
    }

    /// Reads the statement PDF at `path` and extracts it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Pdf`] if the file cannot be read or parsed.
    pub fn load_pdf(
        &mut self,
        path: &Path,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<&Statement, SessionError> {
        let pages = paystub_pdf::extract_pages(path)?;
        Ok(self.load_pages(&pages, progress))
    }

    /// Extracts a statement from already extracted page text, replacing
    /// any previous statement and discarding downstream results.
    pub fn load_pages(
        &mut self,
        pages: &[PageText],
        progress: &Arc<dyn ProgressCallback>,
    ) -> &Statement {
        self.statement = paystub_extract::extract_statement(pages, progress);
        self.outcome = None;
        self.selection = None;

        if self.statement.is_empty() {
            log::warn!("No information found in the statement");
        }
        &self.statement
    }

    /// Matches the extracted records against the glossary. Any previous
    /// manual selection is discarded.
    pub fn run_matcher(&mut self, threshold: Threshold) -> &MatchOutcome {
        if self.glossary.is_empty() {
            log::warn!("Glossary is empty; no deduction will be recognized");
        }
        let outcome = match_records(&self.statement.records, &self.glossary, threshold);
        self.selection = None;
        self.outcome.insert(outcome)
    }

    /// Records currently under review: the manual selection if one was
    /// made, otherwise the last match result.
    #[must_use]
    pub fn current_records(&self) -> &[EnrichedRecord] {
        self.selection
            .as_deref()
            .or_else(|| self.outcome.as_ref().map(|o| o.records.as_slice()))
            .unwrap_or_default()
    }

    /// Unique descriptions of [`Self::current_records`], alphabetically,
    /// with their record counts.
    #[must_use]
    pub fn unique_descriptions(&self) -> Vec<DescriptionCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in self.current_records() {
            *counts.entry(record.description.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, (description, count))| DescriptionCount {
                index: i + 1,
                description: description.to_owned(),
                count,
            })
            .collect()
    }

    /// Narrows the current records to those whose description is in
    /// `descriptions`. Successive calls narrow further. An empty list
    /// leaves the selection unchanged.
    ///
    /// Returns the number of records kept.
    pub fn select<S: AsRef<str>>(&mut self, descriptions: &[S]) -> usize {
        if descriptions.is_empty() {
            log::warn!("No description selected; keeping the current set");
            return self.current_records().len();
        }

        let selected: Vec<EnrichedRecord> = self
            .current_records()
            .iter()
            .filter(|r| descriptions.iter().any(|d| d.as_ref() == r.description))
            .cloned()
            .collect();

        log::info!(
            "Selected {} record(s) across {} description(s)",
            selected.len(),
            descriptions.len()
        );
        let kept = selected.len();
        self.selection = Some(selected);
        kept
    }

    /// Sets the amount already received. Blank input clears it.
    pub fn set_operand_b(&mut self, raw: &str) {
        self.operand_b = OperandB::parse(raw);
    }

    /// The finished ledger: current records in chronological order
    /// followed by the aggregate rows.
    #[must_use]
    pub fn final_ledger(&self) -> Vec<LedgerRow> {
        let mut records = self.current_records().to_vec();
        sort_chronologically(&mut records);
        build_ledger(records, self.operand_b.as_ref())
    }

    /// Table of every extracted record.
    #[must_use]
    pub fn extraction_table(&self, target: Target) -> ReportTable {
        let rows: Vec<LedgerRow> = self
            .statement
            .records
            .iter()
            .cloned()
            .map(LedgerRow::Record)
            .collect();
        ReportTable::build(ReportKind::Extraction, self.identity(), &rows, target)
    }

    /// Table of the final ledger.
    #[must_use]
    pub fn final_table(&self, target: Target) -> ReportTable {
        ReportTable::build(
            ReportKind::FinalDeductions,
            self.identity(),
            &self.final_ledger(),
            target,
        )
    }

    /// Writes the extraction report (PDF) into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Report`] if the report cannot be written.
    pub fn write_extraction_report(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let target = Target::Pdf;
        let name = ReportKind::Extraction.file_name(self.identity(), target);
        let table = self.extraction_table(target);
        Ok(write_report(renderer_for(target).as_ref(), &table, dir, &name)?)
    }

    /// Writes the final deductions report in PDF and DOCX into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptySelection`] if there are no current
    /// records and [`SessionError::Report`] if a report cannot be written.
    pub fn write_final_reports(&self, dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
        if self.current_records().is_empty() {
            return Err(SessionError::EmptySelection);
        }

        [Target::Pdf, Target::Docx]
            .into_iter()
            .map(|target| -> Result<PathBuf, SessionError> {
                let name = ReportKind::FinalDeductions.file_name(self.identity(), target);
                let table = self.final_table(target);
                Ok(write_report(renderer_for(target).as_ref(), &table, dir, &name)?)
            })
            .collect()
    }
}
