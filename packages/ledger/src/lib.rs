#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deduction totals and the owed differential.
//!
//! Given the final, user-curated set of deduction records this crate
//! computes the total (A) and either its double or, when the amount
//! already received (Operand B) is known, the differential `A - B` and its
//! double. The results are appended to the ledger as marker rows.

pub mod convention;

use std::cmp::Ordering;

use paystub_models::{AggregateRow, EnrichedRecord, LedgerRow, MarkerLabel};
use serde::Serialize;

pub use convention::{format_display, format_internal, parse_or_default, swap_convention};

/// Amount already received, as typed by the user and as parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperandB {
    /// The entered text, kept verbatim for the report.
    pub raw: String,
    /// The parsed value ([`parse_or_default`]).
    pub value: f64,
}

impl OperandB {
    /// Parses a user-entered amount. Blank input means "not supplied".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_owned(),
            value: parse_or_default(raw),
        })
    }
}

/// Computed aggregates for one set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    /// Sum of all parsed amounts.
    pub total: f64,
    /// Operand B, when supplied.
    pub operand_b: Option<OperandB>,
    /// `total - operand_b`, when Operand B is supplied.
    pub differential: Option<f64>,
    /// Twice the differential, or twice the total without Operand B.
    pub doubled: f64,
}

/// Progress through the marker-row block. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    /// Nothing emitted yet.
    None,
    /// The total row has been emitted.
    Total,
    /// Operand B has been emitted after the total.
    Operand,
    /// The differential has been emitted.
    Differential,
    /// The block is complete.
    Complete,
}

impl Aggregates {
    /// Builds the marker rows, in order, by walking [`MarkerState`].
    #[must_use]
    pub fn marker_rows(&self) -> Vec<AggregateRow> {
        let mut rows = Vec::new();
        let mut state = MarkerState::None;

        loop {
            let (next, row) = match (state, &self.operand_b, self.differential) {
                (MarkerState::None, _, _) => (
                    MarkerState::Total,
                    marker(MarkerLabel::Total, format_internal(self.total)),
                ),
                (MarkerState::Total, Some(operand), _) => (
                    MarkerState::Operand,
                    marker(MarkerLabel::OperandB, operand.raw.clone()),
                ),
                (MarkerState::Total, None, _) => (
                    MarkerState::Complete,
                    marker(MarkerLabel::DoubledTotal, format_internal(self.doubled)),
                ),
                (MarkerState::Operand, _, differential) => (
                    MarkerState::Differential,
                    marker(
                        MarkerLabel::Differential,
                        format_internal(differential.unwrap_or_default()),
                    ),
                ),
                (MarkerState::Differential, _, _) => (
                    MarkerState::Complete,
                    marker(
                        MarkerLabel::DoubledDifferential,
                        format_internal(self.doubled),
                    ),
                ),
                (MarkerState::Complete, _, _) => break,
            };
            rows.push(row);
            state = next;
        }

        rows
    }
}

const fn marker(label: MarkerLabel, amount: String) -> AggregateRow {
    AggregateRow { label, amount }
}

/// Sums the parsed amounts of `records`.
///
/// Amounts are added in ascending order so the result does not depend on
/// the order of the records.
#[must_use]
pub fn total(records: &[EnrichedRecord]) -> f64 {
    let mut amounts: Vec<f64> = records
        .iter()
        .map(|r| parse_or_default(&r.raw_amount))
        .collect();
    amounts.sort_by(f64::total_cmp);
    amounts.into_iter().sum()
}

/// Computes the aggregates for `records`.
///
/// Returns `None` when the total is exactly zero: there is nothing to
/// total, so no marker rows are produced whatever Operand B is.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn aggregate(records: &[EnrichedRecord], operand_b: Option<&OperandB>) -> Option<Aggregates> {
    let total = total(records);
    if total == 0.0 {
        log::debug!("Total is zero; skipping aggregate rows");
        return None;
    }

    let differential = operand_b.map(|operand| total - operand.value);
    let doubled = 2.0 * differential.unwrap_or(total);

    Some(Aggregates {
        total,
        operand_b: operand_b.cloned(),
        differential,
        doubled,
    })
}

/// Orders records chronologically by period, then by page.
///
/// Records without a period sort last. The sort is stable.
pub fn sort_chronologically(records: &mut [EnrichedRecord]) {
    records.sort_by(|a, b| {
        let by_period = match (a.period, b.period) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_period.then(a.page.cmp(&b.page))
    });
}

/// Turns curated records into a finished ledger: records in their given
/// order followed by the marker rows.
#[must_use]
pub fn build_ledger(records: Vec<EnrichedRecord>, operand_b: Option<&OperandB>) -> Vec<LedgerRow> {
    let markers = aggregate(&records, operand_b)
        .map(|aggregates| aggregates.marker_rows())
        .unwrap_or_default();

    records
        .into_iter()
        .map(LedgerRow::Record)
        .chain(markers.into_iter().map(LedgerRow::Marker))
        .collect()
}
