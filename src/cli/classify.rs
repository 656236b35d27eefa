use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::supply::SupplyEntity;
use crate::ledger::{LedgerBuilder, LinkedLedger};
use crate::parsing;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Supply ledger CSV
    #[arg(long, required = true)]
    pub supply: PathBuf,
}

/// Execute the classify subcommand: show what the supply ledger turns
/// into before any matching happens. Inspection surface for diagnosing
/// why a row did or did not find a partner.
///
/// # Errors
///
/// Returns an error if the ledger cannot be loaded or linking hits an
/// invariant violation.
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let supply = parsing::parse_supply_file(&args.supply)?;
    if verbose {
        eprintln!(
            "Parsed {} supply movements ({} malformed)",
            supply.movements.len(),
            supply.issues.len()
        );
    }

    let mut builder = LedgerBuilder::new();
    for movement in &supply.movements {
        builder.push(crate::classify::classify(movement));
    }
    let linked = builder.finish()?;

    match format {
        OutputFormat::Text => print_text(&linked),
        OutputFormat::Json => print_json(&linked)?,
        OutputFormat::Tsv => print_tsv(&linked),
    }

    Ok(())
}

fn print_text(linked: &LinkedLedger) {
    println!(
        "{} entities, {} orphaned consumptions, {} ignored movements\n",
        linked.index.len(),
        linked.orphans.len(),
        linked.ignored
    );

    for (_, entity) in linked.index.available() {
        match entity {
            SupplyEntity::Order(order) => match &order.consumption {
                Some(c) => println!(
                    "order {}  {} x{}  {} {:.3} at {}",
                    order.order, order.item, order.qty, c.material, c.area, c.timestamp
                ),
                None => println!(
                    "order {}  {} x{}  (no consumption linked)",
                    order.order, order.item, order.qty
                ),
            },
            SupplyEntity::Issue(issue) => println!(
                "issue {}  ref {}  {} {:.3} at {}",
                issue.document, issue.reference, issue.material, issue.area, issue.timestamp
            ),
        }
    }

    if !linked.orphans.is_empty() {
        println!("\nOrphaned consumptions:");
        for orphan in &linked.orphans {
            println!(
                "  order {}  {} {:.3} at {}",
                orphan.order, orphan.material, orphan.area, orphan.timestamp
            );
        }
    }
}

fn print_json(linked: &LinkedLedger) -> anyhow::Result<()> {
    let entities: Vec<&SupplyEntity> = linked.index.available().map(|(_, e)| e).collect();
    let report = serde_json::json!({
        "entities": entities,
        "orphans": linked.orphans,
        "ignored": linked.ignored,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_tsv(linked: &LinkedLedger) {
    println!("kind\treference\titem\tqty\tmaterial\tarea\ttimestamp\tmatchable");
    for (_, entity) in linked.index.available() {
        match entity {
            SupplyEntity::Order(order) => {
                let (material, area, timestamp) = match &order.consumption {
                    Some(c) => (
                        c.material.as_str(),
                        format!("{:.4}", c.area),
                        c.timestamp.to_string(),
                    ),
                    None => ("", String::new(), String::new()),
                };
                println!(
                    "order\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    order.order,
                    order.item,
                    order.qty,
                    material,
                    area,
                    timestamp,
                    entity.is_matchable()
                );
            }
            SupplyEntity::Issue(issue) => println!(
                "issue\t{}\t\t\t{}\t{:.4}\t{}\ttrue",
                issue.document, issue.material, issue.area, issue.timestamp
            ),
        }
    }
}
