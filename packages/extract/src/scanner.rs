//! Line scanner turning raw statement text into typed tokens.
//!
//! The statement's payment table starts after the "Data de Início do
//! Pagamento (DIP)" line. Everything before it is preamble and is ignored.
//! Once the table has started, every following line on every following
//! page is classified as a rubric header, a deduction row, or noise.

use std::sync::LazyLock;

use paystub_models::{DeductionRecord, PageText, Period, Token};
use regex::Regex;

/// Line that opens the payment table. Matched at the start of the line.
static PAYMENT_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Data de Início do Pagamento \(DIP\): \d{2}/\d{2}/\d{4} MR: R\$ [\d.,]+")
        .expect("valid regex")
});

/// Competency label printed inside a page's payment table.
static PAGE_PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Competência\s*(\d{2}/\d{4})").expect("valid regex"));

/// Lines containing this marker (the beneficiary's birth date) are noise.
const EXCLUDED_MARKER: &str = "Data de Nascimento";

/// Uppercase token identifying a rubric header line.
const HEADER_MARKER: &str = "RUBRICA";

/// Currency symbol stripped from descriptions.
const CURRENCY_SYMBOL: &str = "R$";

/// Scanner state. Never reset between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// The payment table has not started yet; lines are discarded.
    #[default]
    BeforeStart,
    /// Inside the payment table; lines are classified.
    Scanning,
}

/// Classification of a single line inside the payment table.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Header,
    Record {
        code: String,
        description: String,
        amount: String,
    },
}

/// Stateful scanner over the pages of one statement.
#[derive(Debug, Default)]
pub struct LineScanner {
    state: ScanState,
    tokens: Vec<Token>,
}

impl LineScanner {
    /// Creates a scanner in the [`ScanState::BeforeStart`] state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scanner state.
    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    /// Scans one page, appending its tokens to the running sequence.
    ///
    /// Pages must be fed in document order.
    pub fn scan_page(&mut self, page: &PageText) {
        let lines = self.table_lines(page);
        if lines.is_empty() {
            return;
        }

        let page_period = page_period(&lines);
        let before = self.tokens.len();

        for line in lines {
            match classify(line) {
                Some(LineKind::Header) => {
                    self.tokens.push(Token::HeaderMarker { page: page.number });
                }
                Some(LineKind::Record {
                    code,
                    description,
                    amount,
                }) => self.tokens.push(Token::Record(DeductionRecord {
                    code,
                    description,
                    raw_amount: amount,
                    page: page.number,
                    page_period,
                })),
                None => {}
            }
        }

        log::trace!(
            "Page {}: {} token(s)",
            page.number,
            self.tokens.len() - before
        );
    }

    /// Consumes the scanner, returning every token emitted so far.
    #[must_use]
    pub fn finish(self) -> Vec<Token> {
        self.tokens
    }

    /// Applies the start trigger and exclusion filter to a page, advancing
    /// the state machine, and returns the surviving lines.
    fn table_lines<'a>(&mut self, page: &'a PageText) -> Vec<&'a str> {
        let mut lines = Vec::new();

        for line in page.lines() {
            if self.state == ScanState::BeforeStart {
                if PAYMENT_START_RE.is_match(line) {
                    log::debug!("Payment table starts on page {}", page.number);
                    self.state = ScanState::Scanning;
                }
                continue;
            }

            if line.contains(EXCLUDED_MARKER) {
                continue;
            }

            lines.push(line);
        }

        lines
    }
}

/// Scans every page of a statement in order.
#[must_use]
pub fn scan(pages: &[PageText]) -> Vec<Token> {
    let mut scanner = LineScanner::new();
    for page in pages {
        scanner.scan_page(page);
    }
    scanner.finish()
}

/// First competency label among a page's table lines.
fn page_period(lines: &[&str]) -> Option<Period> {
    let joined = lines.join("\n");
    PAGE_PERIOD_RE
        .captures(&joined)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn classify(line: &str) -> Option<LineKind> {
    if line.to_uppercase().contains(HEADER_MARKER) {
        return Some(LineKind::Header);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [code, middle @ .., amount] = parts.as_slice() else {
        return None;
    };
    if middle.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let description = middle
        .join(" ")
        .replace(CURRENCY_SYMBOL, "")
        .trim()
        .to_owned();

    Some(LineKind::Record {
        code: (*code).to_owned(),
        description,
        amount: (*amount).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIP: &str = "Data de Início do Pagamento (DIP): 01/01/2020 MR: R$ 1.000,00";

    fn record(token: &Token) -> &DeductionRecord {
        match token {
            Token::Record(record) => record,
            Token::HeaderMarker { .. } => panic!("expected a record, got {token:?}"),
        }
    }

    #[test]
    fn scans_reference_scenario() {
        let page = PageText::new(
            1,
            [
                "noise",
                DIP,
                "RUBRICA desc valor",
                "101 SALARIO BASE 1.500,00",
                "Data de Nascimento 01/01/1990",
            ]
            .join("\n"),
        );

        let tokens = scan(&[page]);

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::HeaderMarker { page: 1 });
        let rec = record(&tokens[1]);
        assert_eq!(rec.code, "101");
        assert_eq!(rec.description, "SALARIO BASE");
        assert_eq!(rec.raw_amount, "1.500,00");
        assert_eq!(rec.page, 1);
    }

    #[test]
    fn discards_everything_without_trigger() {
        let page = PageText::new(1, "RUBRICA\n101 SALARIO BASE 1.500,00");
        assert!(scan(&[page]).is_empty());
    }

    #[test]
    fn state_carries_across_pages() {
        let first = PageText::new(1, format!("header\n{DIP}"));
        let second = PageText::new(2, "Rubrica x\n202 IMPOSTO DE RENDA 10,00");

        let mut scanner = LineScanner::new();
        scanner.scan_page(&first);
        assert_eq!(scanner.state(), ScanState::Scanning);
        scanner.scan_page(&second);
        let tokens = scanner.finish();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].page(), 2);
        assert_eq!(record(&tokens[1]).page, 2);
    }

    #[test]
    fn strips_currency_symbol_from_description() {
        let page = PageText::new(1, format!("{DIP}\n305 CONSIGNADO R$ BANCO X 55,20"));
        let tokens = scan(&[page]);
        assert_eq!(record(&tokens[0]).description, "CONSIGNADO  BANCO X");
    }

    #[test]
    fn drops_malformed_lines() {
        let page = PageText::new(
            1,
            format!("{DIP}\nABC SALARIO 10,00\n101 10,00\n\n   \n12a X 1,00"),
        );
        assert!(scan(&[page]).is_empty());
    }

    #[test]
    fn trigger_must_start_the_line() {
        let page = PageText::new(1, format!("prefix {DIP}\n101 SALARIO BASE 1,00"));
        assert!(scan(&[page]).is_empty());
    }

    #[test]
    fn records_page_competency_label() {
        let page = PageText::new(
            3,
            format!("{DIP}\nCompetência 04/2021\nRUBRICA\n101 SALARIO BASE 1,00"),
        );
        let tokens = scan(&[page]);
        let rec = record(&tokens[1]);
        assert_eq!(rec.page_period, Some("04/2021".parse().unwrap()));
    }

    #[test]
    fn blank_pages_contribute_nothing() {
        let pages = [PageText::new(1, DIP), PageText::new(2, "")];
        assert!(scan(&pages).is_empty());
    }
}
