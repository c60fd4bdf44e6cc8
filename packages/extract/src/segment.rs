//! Segmentation and date binding.
//!
//! Each rubric header starts a new competency segment. Segments are
//! numbered in document order and segment `n` is bound to the `n`-th
//! competency period in chronological order.

use paystub_models::{CompetencyPeriod, DeductionRecord, EnrichedRecord, Token};

/// A deduction record tagged with the segment it was read in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedRecord {
    /// Segment number. `0` means the record preceded every header.
    pub segment: usize,
    /// The scanned record.
    pub record: DeductionRecord,
}

/// Walks the token stream, tagging every record with its segment number.
///
/// Records read before the first header marker are tagged with segment
/// `0`.
#[must_use]
pub fn segment(tokens: Vec<Token>) -> Vec<SegmentedRecord> {
    let mut counter = 0;
    let mut records = Vec::new();

    for token in tokens {
        match token {
            Token::HeaderMarker { .. } => counter += 1,
            Token::Record(record) => records.push(SegmentedRecord {
                segment: counter,
                record,
            }),
        }
    }

    records
}

/// Drops unsegmented records and resolves each remaining record's period.
///
/// Segment `n` binds to `competencies[n - 1]`. When that position is out of
/// range the record keeps the competency label printed on its own page, if
/// any.
#[must_use]
pub fn bind(records: Vec<SegmentedRecord>, competencies: &[CompetencyPeriod]) -> Vec<EnrichedRecord> {
    let total = records.len();
    let mut unresolved = 0_usize;

    let bound: Vec<EnrichedRecord> = records
        .into_iter()
        .filter(|r| r.segment > 0)
        .map(|SegmentedRecord { segment, record }| {
            let period = competencies
                .get(segment - 1)
                .map(|c| c.period)
                .or(record.page_period);
            if period.is_none() {
                unresolved += 1;
            }
            EnrichedRecord {
                code: record.code,
                description: record.description,
                raw_amount: record.raw_amount,
                page: record.page,
                segment,
                period,
            }
        })
        .collect();

    log::debug!(
        "Bound {} of {total} record(s) to segments ({unresolved} without period)",
        bound.len()
    );

    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competency::index_periods;
    use paystub_models::Period;

    fn rec(code: &str, page: u32) -> Token {
        Token::Record(DeductionRecord {
            code: code.to_owned(),
            description: format!("DESC {code}"),
            raw_amount: "1,00".to_owned(),
            page,
            page_period: None,
        })
    }

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn numbers_segments_by_header() {
        let tokens = vec![
            rec("1", 1),
            Token::HeaderMarker { page: 1 },
            rec("2", 1),
            rec("3", 1),
            Token::HeaderMarker { page: 2 },
            rec("4", 2),
        ];
        let segments: Vec<(String, usize)> = segment(tokens)
            .into_iter()
            .map(|s| (s.record.code, s.segment))
            .collect();
        assert_eq!(
            segments,
            vec![
                ("1".to_owned(), 0),
                ("2".to_owned(), 1),
                ("3".to_owned(), 1),
                ("4".to_owned(), 2),
            ]
        );
    }

    #[test]
    fn binds_segments_to_sorted_periods() {
        let competencies = index_periods([period("03/2020"), period("01/2019"), period("12/2019")]);
        let tokens = vec![
            rec("0", 1),
            Token::HeaderMarker { page: 1 },
            rec("1", 1),
            Token::HeaderMarker { page: 1 },
            rec("2", 1),
            Token::HeaderMarker { page: 2 },
            rec("3", 2),
        ];

        let bound = bind(segment(tokens), &competencies);

        assert_eq!(bound.len(), 3);
        assert_eq!(bound[0].period, Some(period("01/2019")));
        assert_eq!(bound[1].period, Some(period("12/2019")));
        assert_eq!(bound[2].period, Some(period("03/2020")));
        assert_eq!(bound[2].segment, 3);
    }

    #[test]
    fn out_of_range_segment_keeps_page_period() {
        let with_label = DeductionRecord {
            code: "9".to_owned(),
            description: "X".to_owned(),
            raw_amount: "1,00".to_owned(),
            page: 4,
            page_period: Some(period("08/2022")),
        };
        let tokens = vec![
            Token::HeaderMarker { page: 4 },
            Token::HeaderMarker { page: 4 },
            Token::Record(with_label),
            rec("10", 4),
        ];

        let competencies = index_periods([period("01/2022")]);
        let bound = bind(segment(tokens), &competencies);

        assert_eq!(bound[0].period, Some(period("08/2022")));
        assert_eq!(bound[1].period, None);
    }

    #[test]
    fn no_competencies_leaves_records_unresolved() {
        let tokens = vec![Token::HeaderMarker { page: 1 }, rec("1", 1)];
        let bound = bind(segment(tokens), &[]);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].period, None);
        assert_eq!(bound[0].period_label(), "N/A");
    }
}
