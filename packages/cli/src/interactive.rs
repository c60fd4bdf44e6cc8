//! Interactive review of one statement.
//!
//! Provides a menu-driven flow using `dialoguer`: the statement is loaded
//! once, then the user filters it against the glossary, narrows the
//! selection, enters the amount already received and generates the final
//! reports, in any order and as often as needed.

use std::path::Path;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use paystub_cli_utils::{IndicatifProgress, MultiProgress};
use paystub_glossary::matcher::Threshold;
use paystub_report::Target;
use paystub_session::{AppConfig, Session, SessionError};

use crate::output;

/// Actions offered once a statement is loaded.
enum ReviewAction {
    FilterWithGlossary,
    SelectDescriptions,
    SetOperandB,
    ShowLedger,
    GenerateFinalReport,
    Quit,
}

impl ReviewAction {
    const ALL: &[Self] = &[
        Self::FilterWithGlossary,
        Self::SelectDescriptions,
        Self::SetOperandB,
        Self::ShowLedger,
        Self::GenerateFinalReport,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::FilterWithGlossary => "Filter deductions with the glossary",
            Self::SelectDescriptions => "Select deductions to include",
            Self::SetOperandB => "Enter amount already received",
            Self::ShowLedger => "Show final ledger",
            Self::GenerateFinalReport => "Generate final report (PDF + DOCX)",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive flow.
///
/// # Errors
///
/// Returns an error if a prompt fails, the statement cannot be read or a
/// report cannot be written.
pub fn run(multi: &MultiProgress, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Paystub Deduction Ledger");
    println!();

    let glossary = paystub_glossary::load(&config.glossary_path);
    if glossary.is_empty() {
        println!("Glossary empty or not found: {}", config.glossary_path.display());
    }
    let mut session = Session::new(glossary);

    let pdf: String = Input::new()
        .with_prompt("Statement PDF")
        .interact_text()?;
    let progress = IndicatifProgress::pages_bar(multi, "Reading statement");
    session.load_pdf(Path::new(pdf.trim()), &progress)?;

    if session.statement().is_empty() {
        println!("No information found in the PDF.");
        return Ok(());
    }

    output::print_table(&session.extraction_table(Target::Pdf));

    let write_extraction = Confirm::new()
        .with_prompt("Write the extraction report (PDF)?")
        .default(true)
        .interact()?;
    if write_extraction {
        let path = session.write_extraction_report(&config.output_dir)?;
        println!("Wrote {}", path.display());
    }

    let labels: Vec<&str> = ReviewAction::ALL.iter().map(ReviewAction::label).collect();
    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match ReviewAction::ALL[idx] {
            ReviewAction::FilterWithGlossary => filter_with_glossary(&mut session, config)?,
            ReviewAction::SelectDescriptions => select_descriptions(&mut session)?,
            ReviewAction::SetOperandB => {
                let raw: String = Input::new()
                    .with_prompt("Amount already received (empty for none)")
                    .allow_empty(true)
                    .interact_text()?;
                session.set_operand_b(&raw);
            }
            ReviewAction::ShowLedger => output::print_table(&session.final_table(Target::Pdf)),
            ReviewAction::GenerateFinalReport => match session.write_final_reports(&config.output_dir) {
                Ok(paths) => {
                    for path in paths {
                        println!("Wrote {}", path.display());
                    }
                }
                Err(SessionError::EmptySelection) => {
                    println!("Nothing selected yet. Filter with the glossary first.");
                }
                Err(e) => return Err(e.into()),
            },
            ReviewAction::Quit => break,
        }
    }

    Ok(())
}

fn filter_with_glossary(
    session: &mut Session,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let level: String = Input::new()
        .with_prompt("Similarity level (0.1 to 1.0)")
        .default(format!("{:.2}", config.threshold))
        .interact_text()?;
    let threshold = level
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_or_else(|_| config.threshold(), Threshold::from_fraction);

    let outcome = session.run_matcher(threshold);
    println!(
        "{} of {} description(s) recognized at {:.0}%, {} record(s) kept.",
        outcome.included_descriptions().count(),
        outcome.decisions.len(),
        threshold.percent(),
        outcome.records.len()
    );
    Ok(())
}

fn select_descriptions(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let listing = session.unique_descriptions();
    if listing.is_empty() {
        println!("Nothing to select. Filter with the glossary first.");
        return Ok(());
    }

    let labels: Vec<String> = listing.iter().map(|d| d.label()).collect();
    let chosen = MultiSelect::new()
        .with_prompt("Mark the deductions to include (space=toggle, enter=confirm)")
        .items(&labels)
        .max_length(20)
        .interact()?;

    if chosen.is_empty() {
        println!("No description selected.");
        return Ok(());
    }

    let descriptions: Vec<&str> = chosen
        .iter()
        .map(|&i| listing[i].description.as_str())
        .collect();
    let kept = session.select(&descriptions);
    println!("{kept} record(s) remain after the selection.");
    Ok(())
}
