#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the paystub deduction ledger.
//!
//! With a subcommand the tool runs one step non-interactively. Without one
//! it starts the interactive flow: load a statement, filter it against the
//! glossary, narrow the selection and generate the final reports.
//!
//! Uses `indicatif-log-bridge` (via [`paystub_cli_utils::init_logger`])
//! so log lines and the page progress bar never fight for the terminal.

mod interactive;
mod output;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use paystub_cli_utils::{IndicatifProgress, MultiProgress};
use paystub_glossary::matcher::{Threshold, decide};
use paystub_report::Target;
use paystub_session::{AppConfig, Session};

#[derive(Parser)]
#[command(name = "paystub", about = "Payslip deduction ledger toolchain")]
struct Cli {
    /// Configuration file (defaults to `paystub.toml` if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Glossary file, one deduction label per line (overrides the config)
    #[arg(long, global = true)]
    glossary: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the dated deduction records of a statement
    Extract {
        /// Statement PDF
        pdf: PathBuf,
        /// Print the statement as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Also write the extraction report (PDF) to the output directory
        #[arg(long)]
        report: bool,
        /// Output directory (overrides the config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List the competency periods found in a statement
    Competencies {
        /// Statement PDF
        pdf: PathBuf,
    },
    /// Build the final deductions report (PDF and DOCX)
    Report {
        /// Statement PDF
        pdf: PathBuf,
        /// Similarity level from 0.0 to 1.0 (overrides the config)
        #[arg(long)]
        threshold: Option<f64>,
        /// Amount already received, e.g. "300,00"
        #[arg(long)]
        operand_b: Option<String>,
        /// Keep only these descriptions (repeatable)
        #[arg(long = "select")]
        selected: Vec<String>,
        /// Output directory (overrides the config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show the glossary, or score a statement's descriptions against it
    Glossary {
        /// Statement PDF whose descriptions should be scored
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Similarity level from 0.0 to 1.0 (overrides the config)
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = paystub_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(glossary) = cli.glossary {
        config.glossary_path = glossary;
    }
    log::debug!("Configuration: {config:?}");

    let Some(command) = cli.command else {
        return interactive::run(&multi, &config);
    };

    match command {
        Commands::Extract {
            pdf,
            json,
            report,
            out_dir,
        } => {
            let session = load_session(&multi, &config, &pdf)?;
            if json {
                println!("{}", serde_json::to_string_pretty(session.statement())?);
            } else {
                output::print_table(&session.extraction_table(Target::Pdf));
            }
            if report {
                let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
                let path = session.write_extraction_report(&dir)?;
                println!("Wrote {}", path.display());
            }
        }
        Commands::Competencies { pdf } => {
            let session = load_session(&multi, &config, &pdf)?;
            let competencies = &session.statement().competencies;
            if competencies.is_empty() {
                println!("No competency periods found.");
            }
            for competency in competencies {
                println!("{:>3}  {}", competency.index, competency.period);
            }
        }
        Commands::Report {
            pdf,
            threshold,
            operand_b,
            selected,
            out_dir,
        } => {
            let mut session = load_session(&multi, &config, &pdf)?;
            let threshold = threshold.map_or_else(|| config.threshold(), Threshold::from_fraction);
            session.run_matcher(threshold);
            if !selected.is_empty() {
                session.select(&selected);
            }
            if let Some(raw) = operand_b {
                session.set_operand_b(&raw);
            }

            output::print_table(&session.final_table(Target::Pdf));

            let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            for path in session.write_final_reports(&dir)? {
                println!("Wrote {}", path.display());
            }
        }
        Commands::Glossary { pdf, threshold } => {
            let glossary = paystub_glossary::load(&config.glossary_path);
            let Some(pdf) = pdf else {
                for (i, term) in glossary.terms().iter().enumerate() {
                    println!("{:>3}  {term}", i + 1);
                }
                return Ok(());
            };

            let session = load_session(&multi, &config, &pdf)?;
            let threshold = threshold.map_or_else(|| config.threshold(), Threshold::from_fraction);
            let descriptions = session
                .statement()
                .records
                .iter()
                .map(|r| r.description.as_str())
                .collect::<BTreeSet<_>>();

            println!("{:<5} {:>6}  {:<40} BEST TERM", "KEEP", "SCORE", "DESCRIPTION");
            for description in descriptions {
                let decision = decide(description, &glossary, threshold);
                println!(
                    "{:<5} {:>6.1}  {:<40} {}",
                    if decision.included { "yes" } else { "no" },
                    decision.best_score,
                    decision.description,
                    decision.best_term.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

/// Loads the glossary and extracts the statement at `pdf` into a new
/// session.
fn load_session(
    multi: &MultiProgress,
    config: &AppConfig,
    pdf: &Path,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::new(paystub_glossary::load(&config.glossary_path));
    let progress = IndicatifProgress::pages_bar(multi, "Reading statement");
    session.load_pdf(pdf, &progress)?;
    Ok(session)
}
