//! Plain-text rendering of report tables for the terminal.

use paystub_report::ReportTable;

/// Lays `table` out as aligned text columns under its title.
pub fn format_table(table: &ReportTable) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut out = vec![table.title.clone(), line(&table.headers)];
    out.push("-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    if table.is_empty() {
        out.push("(no rows)".to_owned());
    }
    out.extend(table.rows.iter().map(|row| line(row)));
    out.join("\n")
}

/// Prints `table` to stdout.
pub fn print_table(table: &ReportTable) {
    println!("{}", format_table(table));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use paystub_models::{AggregateRow, Identity, LedgerRow, MarkerLabel};
    use paystub_report::{ReportKind, Target};

    #[test]
    fn aligns_columns() {
        let rows = vec![LedgerRow::Marker(AggregateRow {
            label: MarkerLabel::Total,
            amount: "1,000.00".to_owned(),
        })];
        let table = ReportTable::build(
            ReportKind::FinalDeductions,
            &Identity::default(),
            &rows,
            Target::Pdf,
        );

        let text = format_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Código  DESCRIÇÃO         DESCONTOS  Data");
        assert_eq!(lines[3], "        Valor Total (R$)  1.000,00");
    }

    #[test]
    fn marks_empty_tables() {
        let table = ReportTable::build(
            ReportKind::Extraction,
            &Identity::default(),
            &[],
            Target::Pdf,
        );
        assert!(format_table(&table).contains("(no rows)"));
    }
}
