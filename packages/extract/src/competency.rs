//! Competency (pay period) extraction.
//!
//! Periods are printed in a small table introduced by a line that carries
//! both the "Competência" and "Período" column headers. The `MM/YYYY`
//! values appear on the next few lines. This scan is independent of the
//! line scanner's state and covers every page.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use paystub_models::{CompetencyPeriod, PageText, Period};
use regex::Regex;

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(0[1-9]|1[0-2])/(\d{4})\b").expect("valid regex"));

const PERIOD_HEADER: &str = "Competência";
const CO_HEADER: &str = "Período";

/// How many lines after a header line are searched for periods.
const LOOKAHEAD_LINES: usize = 3;

/// Extracts every competency period in the document.
///
/// The result is deduplicated, sorted chronologically and then numbered
/// from 1, so index order is always chronological regardless of the page
/// order the periods were found in.
#[must_use]
pub fn extract_competencies(pages: &[PageText]) -> Vec<CompetencyPeriod> {
    let mut periods = BTreeSet::new();

    for page in pages {
        let lines: Vec<&str> = page.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            if !(line.contains(PERIOD_HEADER) && line.contains(CO_HEADER)) {
                continue;
            }
            for following in lines.iter().skip(i + 1).take(LOOKAHEAD_LINES) {
                periods.extend(periods_in(following));
            }
        }
    }

    let competencies = index_periods(periods);
    log::debug!("Found {} competency period(s)", competencies.len());
    competencies
}

/// Numbers already-ordered, unique periods from 1.
#[must_use]
pub fn index_periods(periods: impl IntoIterator<Item = Period>) -> Vec<CompetencyPeriod> {
    let unique: BTreeSet<Period> = periods.into_iter().collect();
    unique
        .into_iter()
        .enumerate()
        .map(|(i, period)| CompetencyPeriod {
            index: i + 1,
            period,
        })
        .collect()
}

fn periods_in(line: &str) -> impl Iterator<Item = Period> + '_ {
    PERIOD_RE.captures_iter(line).filter_map(|caps| {
        let month = caps.get(1)?.as_str().parse().ok()?;
        let year = caps.get(2)?.as_str().parse().ok()?;
        Period::new(month, year)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(competencies: &[CompetencyPeriod]) -> Vec<(usize, String)> {
        competencies
            .iter()
            .map(|c| (c.index, c.period.to_string()))
            .collect()
    }

    #[test]
    fn sorts_and_indexes_chronologically() {
        let page = PageText::new(
            1,
            "Competência Período\n03/2020\n01/2019 12/2019\nignored",
        );
        let competencies = extract_competencies(&[page]);
        assert_eq!(
            labels(&competencies),
            vec![
                (1, "01/2019".to_owned()),
                (2, "12/2019".to_owned()),
                (3, "03/2020".to_owned()),
            ]
        );
    }

    #[test]
    fn deduplicates_across_pages() {
        let first = PageText::new(1, "Competência / Período\n05/2020");
        let second = PageText::new(2, "Período de Competência\n05/2020\n04/2020");
        let competencies = extract_competencies(&[second, first]);
        assert_eq!(
            labels(&competencies),
            vec![(1, "04/2020".to_owned()), (2, "05/2020".to_owned())]
        );
    }

    #[test]
    fn only_looks_three_lines_ahead() {
        let page = PageText::new(1, "Competência Período\na\nb\nc\n06/2020");
        assert!(extract_competencies(&[page]).is_empty());
    }

    #[test]
    fn requires_both_header_words() {
        let page = PageText::new(1, "Competência\n06/2020\nPeríodo\n07/2020");
        assert!(extract_competencies(&[page]).is_empty());
    }

    #[test]
    fn rejects_invalid_months_and_partial_matches() {
        let page = PageText::new(1, "Competência Período\n13/2020 00/2020 101/2020 01/20201");
        assert!(extract_competencies(&[page]).is_empty());
    }

    #[test]
    fn empty_document_has_no_periods() {
        assert!(extract_competencies(&[]).is_empty());
        assert!(extract_competencies(&[PageText::new(1, "")]).is_empty());
    }
}
