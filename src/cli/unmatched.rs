use clap::Args;

use crate::cli::{print_text_report_tail, run_pipeline, OutputFormat, PipelineArgs};
use crate::matching::RunOutcome;

#[derive(Args)]
pub struct UnmatchedArgs {
    #[command(flatten)]
    pub inputs: PipelineArgs,
}

/// Execute the unmatched subcommand: run the full pipeline but report
/// only what it could not resolve, for the human follow-up pull.
///
/// # Errors
///
/// Returns an error if a ledger cannot be loaded or an invariant
/// violation aborts the run.
pub fn run(args: UnmatchedArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let outcome = run_pipeline(&args.inputs, verbose)?;

    match format {
        OutputFormat::Text => {
            if outcome.unmatched.is_empty() && outcome.anomalies.is_empty() {
                println!("Everything matched; nothing to follow up.");
            } else {
                print_text_report_tail(&outcome);
            }
        }
        OutputFormat::Json => print_json_results(&outcome)?,
        OutputFormat::Tsv => print_tsv_results(&outcome),
    }

    Ok(())
}

fn print_json_results(outcome: &RunOutcome) -> anyhow::Result<()> {
    let report = serde_json::json!({
        "unmatched": outcome.unmatched,
        "anomalies": outcome.anomalies,
        "window": outcome.unmatched_span().map(|(earliest, latest)| {
            serde_json::json!({ "earliest": earliest, "latest": latest })
        }),
        "follow_up_keys": outcome.follow_up_keys(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_tsv_results(outcome: &RunOutcome) {
    println!("row\titem\tmaterial\ttimestamp\tarea");
    for row in &outcome.unmatched {
        println!(
            "{}\t{}\t{}\t{}\t{:.4}",
            row.row, row.item, row.material, row.timestamp, row.area
        );
    }
}
