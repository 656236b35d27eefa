use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::{print_text_report_tail, run_pipeline, OutputFormat, PipelineArgs};
use crate::matching::RunOutcome;

#[derive(Args)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub inputs: PipelineArgs,

    /// Write the resolution stream to this CSV file (for grid write-back)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the reconcile subcommand
///
/// # Errors
///
/// Returns an error if a ledger cannot be loaded or an invariant
/// violation aborts the run.
pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let outcome = run_pipeline(&args.inputs, verbose)?;

    if let Some(path) = &args.output {
        write_resolutions_csv(path, &outcome)?;
        if verbose {
            eprintln!(
                "Wrote {} resolutions to {}",
                outcome.resolutions.len(),
                path.display()
            );
        }
    }

    match format {
        OutputFormat::Text => print_text_results(&outcome, args.output.is_none()),
        OutputFormat::Json => print_json_results(&outcome)?,
        OutputFormat::Tsv => print_tsv_results(&outcome),
    }

    Ok(())
}

/// The write-back stream: one record per resolved row at fixed columns.
fn write_resolutions_csv(path: &Path, outcome: &RunOutcome) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["row", "reference", "consumption"])?;
    for resolution in &outcome.resolutions {
        writer.write_record([
            resolution.row.to_string(),
            resolution.reference.as_str().to_string(),
            format!("{:.4}", resolution.consumption),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_text_results(outcome: &RunOutcome, list_resolutions: bool) {
    println!(
        "{} rows resolved, {} excluded, {} not matched, {} anomalies",
        outcome.resolutions.len(),
        outcome.excluded.len(),
        outcome.unmatched.len(),
        outcome.anomalies.len()
    );

    if list_resolutions && !outcome.resolutions.is_empty() {
        println!("\nResolutions:");
        for r in &outcome.resolutions {
            println!(
                "  row {} -> {} ({:.4}, {})",
                r.row, r.reference, r.consumption, r.method
            );
        }
    }

    if !outcome.excluded.is_empty() {
        let rows: Vec<String> = outcome.excluded.iter().map(ToString::to_string).collect();
        println!("\nExcluded rows: {}", rows.join(", "));
    }

    print_text_report_tail(outcome);
}

fn print_json_results(outcome: &RunOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

fn print_tsv_results(outcome: &RunOutcome) {
    println!("row\treference\tconsumption\tmethod");
    for r in &outcome.resolutions {
        println!(
            "{}\t{}\t{:.4}\t{}",
            r.row, r.reference, r.consumption, r.method
        );
    }
}
