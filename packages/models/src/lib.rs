#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Statement, ledger and aggregate row types.
//!
//! This crate defines the typed records that flow through every stage of
//! the paystub pipeline: raw page text, scanner tokens, competency periods,
//! enriched ledger records, glossary match decisions and the synthetic
//! aggregate (marker) rows appended to a finished ledger.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Placeholder used when a field could not be found in the statement.
pub const NOT_AVAILABLE: &str = "N/D";

/// Plain text of a single page of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text. Empty for image-only or unparsable pages.
    pub text: String,
}

impl PageText {
    /// Creates a page from its number and text.
    #[must_use]
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Iterates over the raw lines of the page.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Returns `true` if the page carries no extractable text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A calendar pay period (month/year), displayed as `MM/YYYY`.
///
/// Ordering is chronological: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, returning `None` if `month` is not in `1..=12`.
    #[must_use]
    pub fn new(month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|date| Self {
            year: date.year(),
            month: date.month(),
        })
    }

    /// Month number (`1..=12`).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Four-digit year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

/// Error returned when a string is not a valid `MM/YYYY` period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPeriodError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for InvalidPeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid period '{}': expected MM/YYYY", self.value)
    }
}

impl std::error::Error for InvalidPeriodError {}

impl FromStr for Period {
    type Err = InvalidPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidPeriodError {
            value: s.to_owned(),
        };

        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[2] == b'/'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || b.is_ascii_digit());
        if !well_formed {
            return Err(err());
        }

        let date = NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%Y").map_err(|_| err())?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = InvalidPeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A deduction line item as read from the statement, before segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRecord {
    /// Short numeric rubric code.
    pub code: String,
    /// Free-text description with the currency symbol stripped.
    pub description: String,
    /// Amount exactly as printed in the document.
    pub raw_amount: String,
    /// Page the line was read from.
    pub page: u32,
    /// Competency label printed on the same page, if any.
    pub page_period: Option<Period>,
}

/// Output unit of the line scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// Start of a new competency segment.
    HeaderMarker {
        /// Page the marker was read from.
        page: u32,
    },
    /// A deduction row.
    Record(DeductionRecord),
}

impl Token {
    /// Page the token was read from.
    #[must_use]
    pub const fn page(&self) -> u32 {
        match self {
            Self::HeaderMarker { page } => *page,
            Self::Record(record) => record.page,
        }
    }
}

/// A competency period together with its 1-based chronological index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyPeriod {
    /// 1-based position in the chronologically sorted period list.
    pub index: usize,
    /// The calendar period.
    pub period: Period,
}

/// A deduction record bound to its segment and (when resolvable) period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Short numeric rubric code.
    pub code: String,
    /// Free-text description.
    pub description: String,
    /// Amount exactly as printed in the document.
    pub raw_amount: String,
    /// Page the line was read from.
    pub page: u32,
    /// 1-based competency segment number.
    pub segment: usize,
    /// Resolved competency period, `None` when it could not be resolved.
    pub period: Option<Period>,
}

impl EnrichedRecord {
    /// Period label for display, `N/A` when unresolved.
    #[must_use]
    pub fn period_label(&self) -> String {
        self.period
            .map_or_else(|| "N/A".to_owned(), |period| period.to_string())
    }
}

/// Glossary membership decision for one unique description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    /// The description the decision applies to.
    pub description: String,
    /// Whether the description is recognized by the glossary.
    pub included: bool,
    /// Best similarity score found (0–100).
    pub best_score: f64,
    /// Glossary term that produced the best score.
    pub best_term: Option<String>,
}

/// Fixed descriptions of the synthetic rows appended to a finished ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum MarkerLabel {
    /// Sum of all selected amounts.
    #[strum(serialize = "Valor Total (R$)")]
    Total,
    /// Twice the total, used when no Operand B is supplied.
    #[strum(serialize = "Em dobro (R$)")]
    DoubledTotal,
    /// Amount already received, exactly as entered.
    #[strum(serialize = "Valor Recebido (R$)")]
    OperandB,
    /// Total minus Operand B.
    #[strum(serialize = "Diferença (R$)")]
    Differential,
    /// Twice the differential.
    #[strum(serialize = "Diferença em dobro (R$)")]
    DoubledDifferential,
}

impl MarkerLabel {
    /// Returns `true` if `description` is one of the fixed marker labels.
    #[must_use]
    pub fn matches(description: &str) -> bool {
        Self::from_str(description).is_ok()
    }
}

/// A synthetic aggregate row: a marker label plus its formatted amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Which aggregate this row carries.
    pub label: MarkerLabel,
    /// Formatted amount (or the raw user-entered string for Operand B).
    pub amount: String,
}

/// A row of a finished ledger: either a real record or an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRow {
    /// A deduction record.
    Record(EnrichedRecord),
    /// An aggregate marker row. All columns other than description and
    /// amount are blank.
    Marker(AggregateRow),
}

impl LedgerRow {
    /// Rubric code, blank for marker rows.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Record(record) => &record.code,
            Self::Marker(_) => "",
        }
    }

    /// Description column.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Record(record) => &record.description,
            Self::Marker(marker) => marker.label.as_ref(),
        }
    }

    /// Amount column.
    #[must_use]
    pub fn amount(&self) -> &str {
        match self {
            Self::Record(record) => &record.raw_amount,
            Self::Marker(marker) => &marker.amount,
        }
    }

    /// Period column, blank for marker rows.
    #[must_use]
    pub fn period_label(&self) -> String {
        match self {
            Self::Record(record) => record.period_label(),
            Self::Marker(_) => String::new(),
        }
    }

    /// Page column, blank for marker rows.
    #[must_use]
    pub fn page_label(&self) -> String {
        match self {
            Self::Record(record) => record.page.to_string(),
            Self::Marker(_) => String::new(),
        }
    }

    /// Returns `true` for aggregate marker rows.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, Self::Marker(_))
    }
}

/// Beneficiary identity read from the first page of the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Beneficiary name.
    pub name: String,
    /// NIT (worker identification number).
    pub nit: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: NOT_AVAILABLE.to_owned(),
            nit: NOT_AVAILABLE.to_owned(),
        }
    }
}

impl Identity {
    /// Name to use in titles and filenames, `ND` when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_blank_or_nd(&self.name)
    }

    /// NIT to use in titles and filenames, `ND` when blank.
    #[must_use]
    pub fn display_nit(&self) -> &str {
        non_blank_or_nd(&self.nit)
    }
}

fn non_blank_or_nd(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { "ND" } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn parses_and_displays_period() {
        let period: Period = "03/2020".parse().unwrap();
        assert_eq!(period.month(), 3);
        assert_eq!(period.year(), 2020);
        assert_eq!(period.to_string(), "03/2020");
    }

    #[test]
    fn rejects_invalid_periods() {
        assert!("13/2020".parse::<Period>().is_err());
        assert!("00/2020".parse::<Period>().is_err());
        assert!("3/2020".parse::<Period>().is_err());
        assert!("03-2020".parse::<Period>().is_err());
        assert!("ab/cdef".parse::<Period>().is_err());
    }

    #[test]
    fn periods_order_chronologically() {
        let a: Period = "12/2019".parse().unwrap();
        let b: Period = "01/2020".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn period_serializes_as_string() {
        let period: Period = "07/2021".parse().unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"07/2021\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }

    #[test]
    fn marker_labels_round_trip_through_strings() {
        for label in MarkerLabel::iter() {
            assert!(MarkerLabel::matches(label.as_ref()));
            assert_eq!(label.to_string().parse::<MarkerLabel>().unwrap(), label);
        }
        assert!(!MarkerLabel::matches("SALARIO BASE"));
    }

    #[test]
    fn marker_rows_blank_non_amount_columns() {
        let row = LedgerRow::Marker(AggregateRow {
            label: MarkerLabel::Total,
            amount: "1,000.00".to_owned(),
        });
        assert_eq!(row.code(), "");
        assert_eq!(row.description(), "Valor Total (R$)");
        assert_eq!(row.amount(), "1,000.00");
        assert_eq!(row.period_label(), "");
        assert_eq!(row.page_label(), "");
        assert!(row.is_marker());
    }

    #[test]
    fn identity_falls_back_to_nd_when_blank() {
        let identity = Identity {
            name: "  ".to_owned(),
            nit: "123.456.789-0".to_owned(),
        };
        assert_eq!(identity.display_name(), "ND");
        assert_eq!(identity.display_nit(), "123.456.789-0");
        assert_eq!(Identity::default().display_name(), NOT_AVAILABLE);
    }
}
