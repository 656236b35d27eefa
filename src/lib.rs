//! # ledger-recon
//!
//! A library for reconciling two independently recorded material-movement
//! ledgers: a **demand ledger** of expected consumptions that still need a
//! resolved source, and a **supply ledger** of actual movements
//! (production-order consumption, direct issues).
//!
//! For every demand row the engine finds the supply movement that most
//! plausibly caused it and produces a resolution (a reference plus a
//! consumption magnitude) ready for write-back into the demand grid.
//!
//! ## Features
//!
//! - **Typed classification**: a closed decision table turns raw movement
//!   rows into production orders, consumption events, or direct issues
//! - **Consumption linking**: consumption events merge into their owning
//!   orders; orphans are reported, never dropped
//! - **Strategy cascade**: reference, tight, loose, cross-reference,
//!   same-day and exclusion matching in priority order
//! - **Nearest-neighbor assignment**: greedy minimum-distance pairing
//!   within item/quantity/material neighborhoods
//! - **At-most-once consumption**: a supply entity resolves at most one
//!   demand row, enforced by the ledger index
//!
//! ## Example
//!
//! ```rust,no_run
//! use ledger_recon::classify::classify;
//! use ledger_recon::ledger::LedgerBuilder;
//! use ledger_recon::matching::Reconciler;
//! use ledger_recon::parsing;
//!
//! let demand = parsing::parse_demand_file("demand.csv".as_ref()).unwrap();
//! let supply = parsing::parse_supply_file("mb51.csv".as_ref()).unwrap();
//!
//! let mut builder = LedgerBuilder::new();
//! for movement in &supply.movements {
//!     builder.push(classify(movement));
//! }
//! let mut index = builder.finish().unwrap().index;
//!
//! let outcome = Reconciler::default()
//!     .run(&demand.rows, &mut index, Vec::new(), Vec::new())
//!     .unwrap();
//!
//! for r in &outcome.resolutions {
//!     println!("row {} -> {} ({:.3})", r.row, r.reference, r.consumption);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Data model for demand rows, supply entities and distances
//! - [`classify`]: Movement-row classification and unit normalization
//! - [`ledger`]: Keyed supply-entity index and consumption linker
//! - [`matching`]: Strategy cascade, neighborhoods, nearest-neighbor engine
//! - [`parsing`]: CSV ledger readers and the exclusion-list parser
//! - [`cli`]: Command-line interface implementation

pub mod classify;
pub mod cli;
pub mod core;
pub mod ledger;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::demand::DemandRow;
pub use crate::core::supply::{ConsumptionEvent, DirectIssue, OpenOrder, SupplyEntity};
pub use crate::core::types::{MatchMethod, ResolvedReference, RowId};
pub use crate::ledger::{LedgerBuilder, LedgerIndex};
pub use crate::matching::{MatchResolution, ReconcileConfig, Reconciler, RunOutcome};
