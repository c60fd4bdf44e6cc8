//! Glossary reconciliation of extracted deduction descriptions.
//!
//! Every unique description is scored once against every glossary term;
//! the decision is then shared by all records carrying that description.
//! Matching cost therefore grows with the number of unique descriptions,
//! not with the number of records.

use std::collections::BTreeMap;

use paystub_models::{EnrichedRecord, MatchDecision};
use serde::Serialize;

use crate::Glossary;
use crate::similarity::ratio;

/// Minimum similarity (0–100) a description needs to be recognized.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    /// Default user-facing fraction.
    pub const DEFAULT_FRACTION: f64 = 0.85;

    /// Builds a threshold from a user-facing fraction in `0.0..=1.0`.
    ///
    /// The fraction is scaled by 100 and rounded to two decimals so that
    /// values such as `0.29` become `29.0` rather than `28.999…`.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        Self::from_percent((fraction.clamp(0.0, 1.0) * 10_000.0).round() / 100.0)
    }

    /// Builds a threshold from a percentage in `0.0..=100.0`.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        Self(percent.clamp(0.0, 100.0))
    }

    /// The threshold on the 0–100 scale.
    #[must_use]
    pub const fn percent(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::from_fraction(Self::DEFAULT_FRACTION)
    }
}

/// Result of one matcher invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchOutcome {
    /// One decision per unique description, ordered by description.
    pub decisions: Vec<MatchDecision>,
    /// Records whose description was recognized, in input order.
    pub records: Vec<EnrichedRecord>,
}

impl MatchOutcome {
    /// Descriptions that were recognized.
    pub fn included_descriptions(&self) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(|d| d.included)
            .map(|d| d.description.as_str())
    }
}

/// Scores one description against every glossary term.
#[must_use]
pub fn decide(description: &str, glossary: &Glossary, threshold: Threshold) -> MatchDecision {
    let best = glossary
        .terms()
        .iter()
        .map(|term| (ratio(description, term), term))
        .fold(None::<(f64, &String)>, |best, (score, term)| match best {
            Some((best_score, _)) if best_score >= score => best,
            _ => Some((score, term)),
        });

    let (best_score, best_term) = best.map_or((0.0, None), |(score, term)| (score, Some(term.clone())));

    MatchDecision {
        description: description.to_owned(),
        included: best_term.is_some() && best_score >= threshold.percent(),
        best_score,
        best_term,
    }
}

/// Keeps the records whose description is recognized by the glossary.
///
/// Records with a blank amount are discarded first. An empty glossary or
/// an empty record set produces an empty outcome.
#[must_use]
pub fn match_records(
    records: &[EnrichedRecord],
    glossary: &Glossary,
    threshold: Threshold,
) -> MatchOutcome {
    let candidates: Vec<&EnrichedRecord> = records
        .iter()
        .filter(|r| !r.raw_amount.trim().is_empty())
        .collect();

    if candidates.is_empty() || glossary.is_empty() {
        return MatchOutcome::default();
    }

    let mut decisions: BTreeMap<&str, MatchDecision> = BTreeMap::new();
    for &record in &candidates {
        decisions
            .entry(record.description.as_str())
            .or_insert_with(|| decide(&record.description, glossary, threshold));
    }

    let matched: Vec<EnrichedRecord> = candidates
        .into_iter()
        .filter(|r| decisions.get(r.description.as_str()).is_some_and(|d| d.included))
        .cloned()
        .collect();

    log::info!(
        "Glossary match at {:.0}%: {} of {} description(s) recognized, {} record(s) kept",
        threshold.percent(),
        decisions.values().filter(|d| d.included).count(),
        decisions.len(),
        matched.len()
    );

    MatchOutcome {
        decisions: decisions.into_values().collect(),
        records: matched,
    }
}
