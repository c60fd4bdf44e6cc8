#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deduction glossary loading and fuzzy reconciliation.
//!
//! The glossary is a controlled vocabulary of recognized deduction
//! categories ("rubricas"), kept as a plain-text file with one canonical
//! label per line. [`matcher`] decides which extracted descriptions belong
//! to it.

pub mod matcher;
pub mod similarity;

use std::path::Path;

use serde::Serialize;

/// Ordered list of canonical deduction labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Glossary {
    terms: Vec<String>,
}

impl Glossary {
    /// Builds a glossary from labels, trimming each and skipping blanks.
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Parses a glossary file's contents (one label per line).
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        Self::new(contents.lines())
    }

    /// Labels in file order.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the glossary has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Loads the glossary file at `path`.
///
/// A missing or unreadable file yields an empty glossary and a warning;
/// this never fails.
#[must_use]
pub fn load(path: &Path) -> Glossary {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let glossary = Glossary::parse(&contents);
            log::info!(
                "Loaded {} glossary term(s) from {}",
                glossary.len(),
                path.display()
            );
            glossary
        }
        Err(e) => {
            log::warn!("Failed to load glossary from {}: {e}", path.display());
            Glossary::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_keeps_order() {
        let glossary = Glossary::parse("  INSS \nSALARIO BASE\n\n   \nIMPOSTO DE RENDA\r\n");
        assert_eq!(
            glossary.terms(),
            &["INSS", "SALARIO BASE", "IMPOSTO DE RENDA"]
        );
    }

    #[test]
    fn missing_file_yields_empty_glossary() {
        let glossary = load(Path::new("/nonexistent/Rubricas.txt"));
        assert!(glossary.is_empty());
    }

    #[test]
    fn loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("paystub_glossary_{}.txt", std::process::id()));
        std::fs::write(&path, "CONSIGNACAO\nPENSAO ALIMENTICIA\n").unwrap();

        let glossary = load(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.terms()[1], "PENSAO ALIMENTICIA");
    }
}
