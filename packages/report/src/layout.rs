//! Report layouts: which columns a report shows and how wide they are.
//!
//! A layout is an ordered list of `(label, accessor)` pairs. Applying it to
//! ledger rows renders every cell to text and produces a [`ReportTable`],
//! the only thing the renderers ever see.

use std::collections::BTreeMap;

use paystub_ledger::swap_convention;
use paystub_models::{Identity, LedgerRow, MarkerLabel};
use strum_macros::{AsRefStr, Display, EnumString};

/// Width used for columns without an explicit hint, in millimetres.
pub const DEFAULT_COLUMN_WIDTH_MM: f32 = 25.0;

/// One column of a layout: its header label and how to read its value.
#[derive(Clone, Copy)]
pub struct ColumnSpec {
    /// Header label.
    pub label: &'static str,
    /// Renders the cell for a ledger row.
    pub accessor: fn(&LedgerRow) -> String,
    /// Whether this column carries the row description.
    pub is_description: bool,
}

impl std::fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("label", &self.label)
            .field("is_description", &self.is_description)
            .finish_non_exhaustive()
    }
}

const fn column(label: &'static str, accessor: fn(&LedgerRow) -> String) -> ColumnSpec {
    ColumnSpec {
        label,
        accessor,
        is_description: false,
    }
}

const fn description_column(label: &'static str) -> ColumnSpec {
    ColumnSpec {
        label,
        accessor: |row| row.description().to_owned(),
        is_description: true,
    }
}

fn code(row: &LedgerRow) -> String {
    row.code().to_owned()
}

fn amount(row: &LedgerRow) -> String {
    row.amount().to_owned()
}

fn period(row: &LedgerRow) -> String {
    row.period_label()
}

fn page(row: &LedgerRow) -> String {
    row.page_label()
}

/// Columns of the extraction report (every extracted record).
pub const EXTRACTION_COLUMNS: [ColumnSpec; 5] = [
    column("Código", code),
    description_column("Descrição Rubrica"),
    column("Valor", amount),
    column("Data", period),
    column("Página", page),
];

/// Columns of the final deductions report.
pub const FINAL_COLUMNS: [ColumnSpec; 4] = [
    column("Código", code),
    description_column("DESCRIÇÃO"),
    column("DESCONTOS", amount),
    column("Data", period),
];

/// The output format a table is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    /// Fixed-page paginated PDF.
    Pdf,
    /// Flowing-table DOCX document.
    Docx,
}

impl Target {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// The kinds of report the toolchain produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReportKind {
    /// Every extracted record with its date and page.
    Extraction,
    /// The curated, chronologically ordered deductions with aggregates.
    FinalDeductions,
}

impl ReportKind {
    /// Report title for the given beneficiary.
    #[must_use]
    pub fn title(self, identity: &Identity) -> String {
        let (name, nit) = (identity.display_name(), identity.display_nit());
        match self {
            Self::Extraction => format!("Contracheque ISS - {name} - {nit}"),
            Self::FinalDeductions => {
                format!("Descontos Finais (Cronológico) - {name} - {nit}")
            }
        }
    }

    /// Deterministic output filename. Same inputs always give the same
    /// name. Path separators in the name or NIT become `-`.
    #[must_use]
    pub fn file_name(self, identity: &Identity, target: Target) -> String {
        let name = file_component(identity.display_name());
        let nit = file_component(identity.display_nit());
        let ext = target.extension();
        match self {
            Self::Extraction => format!("Contracheque ISS_{name}_{nit}.{ext}"),
            Self::FinalDeductions => {
                format!("Contracheque ISS_Descontos_Finais_{name}_{nit}.{ext}")
            }
        }
    }

    /// Ordered columns of this report.
    #[must_use]
    pub const fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Self::Extraction => &EXTRACTION_COLUMNS,
            Self::FinalDeductions => &FINAL_COLUMNS,
        }
    }

    /// Column width hints in millimetres, keyed by column label.
    #[must_use]
    pub fn widths(self, target: Target) -> BTreeMap<String, f32> {
        let hints: &[(&str, f32)] = match (self, target) {
            (Self::Extraction, _) => &[
                ("Código", 30.0),
                ("Descrição Rubrica", 130.0),
                ("Valor", 40.0),
                ("Data", 40.0),
                ("Página", 40.0),
            ],
            (Self::FinalDeductions, Target::Pdf) => &[
                ("Código", 25.0),
                ("DESCRIÇÃO", 150.0),
                ("DESCONTOS", 35.0),
                ("Data", 40.0),
            ],
            (Self::FinalDeductions, Target::Docx) => &[
                ("Código", 20.0),
                ("DESCRIÇÃO", 130.0),
                ("DESCONTOS", 40.0),
                ("Data", 30.0),
            ],
        };
        hints
            .iter()
            .map(|&(label, width)| (label.to_owned(), width))
            .collect()
    }

    /// Row height in millimetres for paginated output.
    #[must_use]
    pub const fn row_height_mm(self) -> f32 {
        match self {
            Self::Extraction => 10.0,
            Self::FinalDeductions => 8.0,
        }
    }

    /// Whether amounts are rewritten to the display convention after the
    /// cells are rendered.
    #[must_use]
    pub const fn uses_display_convention(self) -> bool {
        matches!(self, Self::FinalDeductions)
    }
}

fn file_component(value: &str) -> String {
    value.replace(['/', '\\'], "-")
}

/// A fully rendered table: header labels, text cells and layout hints.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    /// Title printed above the table.
    pub title: String,
    /// Header labels, in render order.
    pub headers: Vec<String>,
    /// Rendered rows; each has one cell per header.
    pub rows: Vec<Vec<String>>,
    /// Width hints in millimetres keyed by header label.
    pub widths: BTreeMap<String, f32>,
    /// Index of the description column, used to spot marker rows.
    pub description_column: Option<usize>,
    /// Row height in millimetres for paginated output.
    pub row_height_mm: f32,
}

impl ReportTable {
    /// Renders `rows` through `kind`'s layout for `target`.
    #[must_use]
    pub fn build(kind: ReportKind, identity: &Identity, rows: &[LedgerRow], target: Target) -> Self {
        let columns = kind.columns();
        let table = Self {
            title: kind.title(identity),
            headers: columns.iter().map(|c| c.label.to_owned()).collect(),
            rows: rows
                .iter()
                .map(|row| columns.iter().map(|c| (c.accessor)(row)).collect())
                .collect(),
            widths: kind.widths(target),
            description_column: columns.iter().position(|c| c.is_description),
            row_height_mm: kind.row_height_mm(),
        };

        if kind.uses_display_convention() {
            table.rewrite_amounts()
        } else {
            table
        }
    }

    /// Runs the convention-swap pass over every rendered cell. The amount
    /// already received keeps the text it was typed with.
    #[must_use]
    pub fn rewrite_amounts(mut self) -> Self {
        let column = self.description_column;
        for row in &mut self.rows {
            let verbatim = column
                .and_then(|i| row.get(i))
                .is_some_and(|description| matches!(description.parse(), Ok(MarkerLabel::OperandB)));
            if verbatim {
                continue;
            }
            for cell in row.iter_mut() {
                *cell = swap_convention(cell);
            }
        }
        self
    }

    /// Width hint for `label`, falling back to
    /// [`DEFAULT_COLUMN_WIDTH_MM`].
    #[must_use]
    pub fn width_of(&self, label: &str) -> f32 {
        self.widths
            .get(label)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH_MM)
    }

    /// Column widths in header order.
    #[must_use]
    pub fn column_widths(&self) -> Vec<f32> {
        self.headers.iter().map(|h| self.width_of(h)).collect()
    }

    /// Returns `true` if `row` is an aggregate marker row, judged by its
    /// description cell.
    #[must_use]
    pub fn is_marker_row(&self, row: &[String]) -> bool {
        self.description_column
            .and_then(|i| row.get(i))
            .is_some_and(|description| MarkerLabel::matches(description))
    }

    /// Returns `true` if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paystub_models::{AggregateRow, EnrichedRecord};

    fn identity() -> Identity {
        Identity {
            name: "JOAO DA SILVA".to_owned(),
            nit: "123.456.789-0".to_owned(),
        }
    }

    fn ledger() -> Vec<LedgerRow> {
        vec![
            LedgerRow::Record(EnrichedRecord {
                code: "216".to_owned(),
                description: "CONSIGNACAO".to_owned(),
                raw_amount: "1234.50".to_owned(),
                page: 3,
                segment: 1,
                period: Some("02/2020".parse().unwrap()),
            }),
            LedgerRow::Marker(AggregateRow {
                label: MarkerLabel::Total,
                amount: "1,234.50".to_owned(),
            }),
        ]
    }

    #[test]
    fn builds_final_table_with_display_amounts() {
        let table = ReportTable::build(
            ReportKind::FinalDeductions,
            &identity(),
            &ledger(),
            Target::Pdf,
        );

        assert_eq!(table.headers, vec!["Código", "DESCRIÇÃO", "DESCONTOS", "Data"]);
        assert_eq!(table.rows[0], vec!["216", "CONSIGNACAO", "1.234,50", "02/2020"]);
        assert_eq!(table.rows[1], vec!["", "Valor Total (R$)", "1.234,50", ""]);
        assert_eq!(
            table.title,
            "Descontos Finais (Cronológico) - JOAO DA SILVA - 123.456.789-0"
        );
    }

    #[test]
    fn amount_received_keeps_its_typed_text() {
        let mut rows = ledger();
        rows.push(LedgerRow::Marker(AggregateRow {
            label: MarkerLabel::OperandB,
            amount: "1,300.00".to_owned(),
        }));
        rows.push(LedgerRow::Marker(AggregateRow {
            label: MarkerLabel::Differential,
            amount: "-65.50".to_owned(),
        }));

        let table = ReportTable::build(ReportKind::FinalDeductions, &identity(), &rows, Target::Pdf);

        assert_eq!(table.rows[2], vec!["", "Valor Recebido (R$)", "1,300.00", ""]);
        assert_eq!(table.rows[3], vec!["", "Diferença (R$)", "-65,50", ""]);
    }

    #[test]
    fn extraction_table_keeps_raw_amounts() {
        let table = ReportTable::build(ReportKind::Extraction, &identity(), &ledger(), Target::Pdf);
        assert_eq!(table.rows[0][2], "1234.50");
        assert_eq!(table.rows[0][4], "3");
    }

    #[test]
    fn detects_marker_rows_by_description() {
        let table = ReportTable::build(
            ReportKind::FinalDeductions,
            &identity(),
            &ledger(),
            Target::Docx,
        );
        assert!(!table.is_marker_row(&table.rows[0]));
        assert!(table.is_marker_row(&table.rows[1]));
    }

    #[test]
    fn unlisted_columns_use_default_width() {
        let mut table = ReportTable::build(
            ReportKind::FinalDeductions,
            &identity(),
            &[],
            Target::Docx,
        );
        table.headers.push("Extra".to_owned());
        assert!((table.width_of("Extra") - DEFAULT_COLUMN_WIDTH_MM).abs() < f32::EPSILON);
        assert_eq!(table.column_widths(), vec![20.0, 130.0, 40.0, 30.0, 25.0]);
        assert!(table.is_empty());
    }

    #[test]
    fn derives_file_names() {
        assert_eq!(
            ReportKind::Extraction.file_name(&identity(), Target::Pdf),
            "Contracheque ISS_JOAO DA SILVA_123.456.789-0.pdf"
        );
        assert_eq!(
            ReportKind::FinalDeductions.file_name(&Identity::default(), Target::Docx),
            "Contracheque ISS_Descontos_Finais_N-D_N-D.docx"
        );
    }
}
