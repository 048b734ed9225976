//! TableMatch - CSV similarity tool
//!
//! A standalone executable that compares a candidate CSV against a
//! reference CSV and emits a JSON report quantifying how closely the
//! candidate reproduces the reference: unique-key row alignment, column
//! mapping under renames, and per-column similarity scores.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::fs;
use std::path::PathBuf;

use tablematch::{compare_files, CompareConfig};

/// TableMatch - compare a candidate CSV to a reference CSV and emit a
/// similarity report
#[derive(Parser)]
#[command(name = "TableMatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Reference CSV (ground truth)
    #[arg(long)]
    reference: PathBuf,

    /// Candidate CSV to evaluate
    #[arg(long)]
    candidate: PathBuf,

    /// Optional path to write the JSON report (stdout if omitted)
    #[arg(long)]
    output_json: Option<PathBuf>,

    /// Aligned-row sample size used for column mapping confidence
    #[arg(long, default_value = "256")]
    sample_size_mapping: usize,
}

fn main() -> Result<()> {
    // Initialize logger (controlled by RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = CompareConfig {
        sample_size_mapping: cli.sample_size_mapping,
        ..CompareConfig::default()
    };

    let report = compare_files(&cli.reference, &cli.candidate, &config)
        .context("comparison aborted")?;
    let payload = report.to_json(true);

    match cli.output_json {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            fs::write(&path, format!("{payload}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;

            println!(
                "{} {}",
                style("Wrote JSON report:").dim(),
                style(path.display()).white().bold()
            );
            println!("{} {}", style("Status:").dim(), report.status.as_str());
            println!(
                "{} {:.12}",
                style("Dataset similarity (equal weighted):").dim(),
                report.scores.dataset_similarity_equal_weighted
            );
            println!(
                "{} {:.12} / {:.12}",
                style("Coverage (reference/candidate):").dim(),
                report.row_alignment.coverage_reference,
                report.row_alignment.coverage_candidate
            );
            println!(
                "{} {:.12}",
                style("Overall score with coverage:").dim(),
                report.scores.overall_score_with_coverage
            );
        }
        None => println!("{payload}"),
    }

    Ok(())
}
