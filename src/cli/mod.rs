//! Command-line interface for ledger-recon.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **reconcile**: Run the full matching pipeline and emit resolutions
//! - **unmatched**: Same pipeline, report only what could not be resolved
//! - **classify**: Parse and classify the supply ledger for inspection
//!
//! ## Usage
//!
//! ```text
//! # Full run, resolutions written for grid write-back
//! ledger-recon reconcile --demand demand.csv --supply mb51.csv -o updates.csv
//!
//! # With the upstream rejection log as an exclusion list
//! ledger-recon reconcile --demand demand.csv --supply mb51.csv --exclusions inbox.txt
//!
//! # What still needs a follow-up pull
//! ledger-recon unmatched --demand demand.csv --supply mb51.csv
//!
//! # JSON output for scripting
//! ledger-recon reconcile --demand demand.csv --supply mb51.csv --format json
//! ```

use clap::{Parser, Subcommand};

use crate::core::types::LedgerKind;
use crate::ledger::LedgerBuilder;
use crate::matching::outcome::Anomaly;
use crate::matching::{ReconcileConfig, Reconciler, RunOutcome, Tolerances};
use crate::parsing::{self, RowIssue};

pub mod classify;
pub mod reconcile;
pub mod unmatched;

#[derive(Parser)]
#[command(name = "ledger-recon")]
#[command(version)]
#[command(about = "Reconcile demand and supply material-movement ledgers")]
#[command(
    long_about = "ledger-recon assigns, for every demand-ledger row, the supply-ledger movement that most plausibly caused it.\n\nSupply rows are classified into production orders and direct issues, consumption events are linked to their orders, and demand rows are resolved through a prioritized strategy cascade followed by nearest-neighbor assignment within item/quantity/material neighborhoods."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the matching pipeline and emit resolutions
    Reconcile(reconcile::ReconcileArgs),

    /// Report unresolved rows and anomalies without emitting resolutions
    Unmatched(unmatched::UnmatchedArgs),

    /// Parse and classify the supply ledger
    Classify(classify::ClassifyArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Shared input surface of the `reconcile` and `unmatched` commands
#[derive(clap::Args)]
pub struct PipelineArgs {
    /// Demand ledger CSV
    #[arg(long, required = true)]
    pub demand: std::path::PathBuf,

    /// Supply ledger CSV
    #[arg(long, required = true)]
    pub supply: std::path::PathBuf,

    /// Rejection log to parse the exclusion list from
    #[arg(long)]
    pub exclusions: Option<std::path::PathBuf>,

    /// Strict area tolerance for tight/cross-reference/same-day matching
    #[arg(long, default_value = "0.001")]
    pub tight_tolerance: f64,

    /// Wide area tolerance for loose matching
    #[arg(long, default_value = "100")]
    pub loose_tolerance: f64,
}

fn issues_to_anomalies(issues: Vec<RowIssue>, ledger: LedgerKind) -> Vec<Anomaly> {
    issues
        .into_iter()
        .map(|issue| Anomaly::MalformedRow {
            ledger,
            line: issue.line,
            message: issue.message,
        })
        .collect()
}

/// Load both ledgers, build the supply index, and run one reconciliation.
pub(crate) fn run_pipeline(args: &PipelineArgs, verbose: bool) -> anyhow::Result<RunOutcome> {
    let demand = parsing::parse_demand_file(&args.demand)?;
    if verbose {
        eprintln!(
            "Parsed {} demand rows ({} malformed)",
            demand.rows.len(),
            demand.issues.len()
        );
    }

    let supply = parsing::parse_supply_file(&args.supply)?;
    let mut builder = LedgerBuilder::new();
    for movement in &supply.movements {
        builder.push(crate::classify::classify(movement));
    }
    let linked = builder.finish()?;
    if verbose {
        eprintln!(
            "Classified {} supply movements: {} entities, {} orphaned consumptions, {} ignored",
            supply.movements.len(),
            linked.index.len(),
            linked.orphans.len(),
            linked.ignored
        );
    }

    let exclusions = match &args.exclusions {
        Some(path) => {
            let entries = parsing::parse_exclusions_file(path)?;
            if verbose {
                eprintln!("Loaded {} exclusion entries", entries.len());
            }
            entries
        }
        None => Vec::new(),
    };

    let mut anomalies = issues_to_anomalies(demand.issues, LedgerKind::Demand);
    anomalies.extend(issues_to_anomalies(supply.issues, LedgerKind::Supply));
    anomalies.extend(
        linked
            .orphans
            .into_iter()
            .map(|o| Anomaly::OrphanedConsumption {
                order: o.order,
                material: o.material,
                timestamp: o.timestamp,
                area: o.area,
            }),
    );

    let config = ReconcileConfig {
        tolerances: Tolerances {
            tight: args.tight_tolerance,
            loose: args.loose_tolerance,
        },
    };
    let mut index = linked.index;
    let outcome = Reconciler::new(config).run(&demand.rows, &mut index, exclusions, anomalies)?;

    Ok(outcome)
}

/// Anomaly/unmatched tail shared by the text reports.
pub(crate) fn print_text_report_tail(outcome: &RunOutcome) {
    if !outcome.anomalies.is_empty() {
        println!("\nAnomalies:");
        for anomaly in &outcome.anomalies {
            println!("  - {anomaly}");
        }
    }

    if !outcome.unmatched.is_empty() {
        println!("\nNot matched ({} rows):", outcome.unmatched.len());
        for row in &outcome.unmatched {
            println!(
                "  row {}: {} / {} ({:.3} at {})",
                row.row, row.item, row.material, row.area, row.timestamp
            );
        }

        if let Some((earliest, latest)) = outcome.unmatched_span() {
            println!("\nUnmatched window: {earliest} .. {latest}");
        }
        println!("Follow-up keys: {}", outcome.follow_up_keys().join(", "));
    }
}
