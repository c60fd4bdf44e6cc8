#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statement extraction: from per-page text to a dated deduction ledger.
//!
//! The pipeline runs in four steps:
//!
//! 1. [`scanner`] turns raw lines into header markers and deduction rows.
//! 2. [`competency`] independently collects the statement's pay periods.
//! 3. [`segment`] numbers the rubric blocks and binds each row to a period.
//! 4. [`identity`] reads the beneficiary's name and NIT.
//!
//! [`extract_statement`] runs all of them over one document.

pub mod competency;
pub mod identity;
pub mod progress;
pub mod scanner;
pub mod segment;

use std::sync::Arc;

use paystub_models::{CompetencyPeriod, EnrichedRecord, Identity, PageText};
use serde::Serialize;

use crate::progress::ProgressCallback;
use crate::scanner::LineScanner;

/// Everything extracted from one statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statement {
    /// Beneficiary identity.
    pub identity: Identity,
    /// Competency periods in chronological order.
    pub competencies: Vec<CompetencyPeriod>,
    /// Segmented, dated deduction records in document order.
    pub records: Vec<EnrichedRecord>,
}

impl Statement {
    /// Returns `true` when no deduction record was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs the full extraction pipeline over the pages of one statement.
#[must_use]
pub fn extract_statement(pages: &[PageText], progress: &Arc<dyn ProgressCallback>) -> Statement {
    progress.set_total(pages.len() as u64);
    progress.set_message("Scanning pages".to_owned());

    let mut scanner = LineScanner::new();
    for page in pages {
        scanner.scan_page(page);
        progress.inc(1);
    }
    let tokens = scanner.finish();

    let competencies = competency::extract_competencies(pages);
    let records = segment::bind(segment::segment(tokens), &competencies);
    let identity = identity::extract_identity(pages);

    if records.is_empty() {
        log::warn!("No deduction records found in {} page(s)", pages.len());
    } else {
        log::info!(
            "Extracted {} record(s) across {} competency period(s)",
            records.len(),
            competencies.len()
        );
    }
    progress.finish(format!("Scanned {} page(s)", pages.len()));

    Statement {
        identity,
        competencies,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;

    fn statement_pages() -> Vec<PageText> {
        vec![
            PageText::new(
                1,
                "NIT: 123.456.789-0\nNome: JOAO DA SILVA\n\
                 Competência Período\n02/2020 01/2020\n\
                 Data de Início do Pagamento (DIP): 01/01/2020 MR: R$ 1.000,00\n\
                 101 ORPHAN 1,00\n\
                 RUBRICA DESCRICAO VALOR\n\
                 216 CONSIGNACAO EMPRESTIMO BANCARIO 150,00",
            ),
            PageText::new(2, ""),
            PageText::new(
                3,
                "Data de Nascimento 01/01/1950\n\
                 RUBRICA DESCRICAO VALOR\n\
                 216 CONSIGNACAO EMPRESTIMO BANCARIO 150,00\n\
                 268 CONTRIB. SINDICAL R$ 12,50",
            ),
        ]
    }

    #[test]
    fn extracts_dated_records() {
        let statement = extract_statement(&statement_pages(), &null_progress());

        assert_eq!(statement.identity.name, "JOAO DA SILVA");
        assert_eq!(statement.competencies.len(), 2);
        assert_eq!(statement.records.len(), 3);

        let labels: Vec<String> = statement
            .records
            .iter()
            .map(|r| format!("{} {} {}", r.code, r.period_label(), r.page))
            .collect();
        assert_eq!(
            labels,
            vec!["216 01/2020 1", "216 02/2020 3", "268 02/2020 3"]
        );
        assert_eq!(statement.records[2].description, "CONTRIB. SINDICAL");
    }

    #[test]
    fn empty_document_yields_empty_statement() {
        let statement = extract_statement(&[], &null_progress());
        assert!(statement.is_empty());
        assert!(statement.competencies.is_empty());
    }
}
