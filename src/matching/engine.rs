use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::core::demand::DemandRow;
use crate::core::types::{ExclusionEntry, MatchMethod, RowId};
use crate::ledger::{LedgerError, LedgerIndex};
use crate::matching::neighborhood;
use crate::matching::outcome::{Anomaly, MatchResolution, RunOutcome, UnmatchedRow};
use crate::matching::strategy::{self, RowOutcome, Tolerances};

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A supply entity was about to resolve a second demand row. This is
    /// an upstream data or logic defect; aborting beats a half-correct
    /// write-back.
    #[error("supply entity {reference} consumed twice (second use by row {row})")]
    DuplicateConsumption { reference: String, row: RowId },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Tunable parameters of one reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    pub tolerances: Tolerances,
}

/// Drives one single-threaded, single-pass reconciliation run: settled
/// rows claim their entities, the strategy cascade runs per row, the
/// remainder goes through neighborhood nearest-neighbor assignment, and
/// the applier emits the final outcome.
#[derive(Debug, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Run the full matching pipeline.
    ///
    /// `anomalies` seeds the outcome with whatever the load phase already
    /// collected (orphaned consumptions, malformed rows); matching appends
    /// its own and never drops any.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::DuplicateConsumption`] if the at-most-once
    /// invariant would be violated.
    pub fn run(
        &self,
        demand: &[DemandRow],
        index: &mut LedgerIndex,
        mut exclusions: Vec<ExclusionEntry>,
        mut anomalies: Vec<Anomaly>,
    ) -> Result<RunOutcome, ReconcileError> {
        let mut resolutions: Vec<MatchResolution> = Vec::new();
        let mut excluded: Vec<RowId> = Vec::new();
        let mut pending: Vec<&DemandRow> = Vec::new();

        // Rows settled by a previous run still hold their claim on the
        // supply side; take those entities out before anything can match
        // them. Removal is idempotent, so a stale reference is harmless.
        for row in demand {
            if row.is_settled() {
                if let Some(reference) = row.reference.as_deref() {
                    index.remove(reference);
                }
            } else {
                pending.push(row);
            }
        }

        // Phase 1: prioritized strategy cascade, row by row.
        let mut leftovers: Vec<&DemandRow> = Vec::new();
        for row in pending {
            match strategy::apply_cascade(row, index, &mut exclusions, &self.config.tolerances) {
                RowOutcome::Matched(resolution) => {
                    debug!(row = %resolution.row, reference = %resolution.reference,
                        method = %resolution.method, "cascade match");
                    resolutions.push(resolution);
                }
                RowOutcome::Excluded => excluded.push(row.row),
                RowOutcome::ReferenceMissing { reference } => {
                    anomalies.push(Anomaly::ReferenceNotFound {
                        row: row.row,
                        reference,
                    });
                }
                RowOutcome::Unresolved => leftovers.push(row),
            }
        }

        // Phase 2: nearest-neighbor assignment within neighborhoods.
        let mut nearest: Vec<MatchResolution> = Vec::new();
        for mut hood in neighborhood::partition(&leftovers, index) {
            debug!(key = %hood.key, demand = hood.demand_len(), supply = hood.supply_len(),
                "neighborhood");
            while let Some((row, candidate)) = hood.extract() {
                // Cascade matches removed their entity on the spot; the
                // nearest-neighbor pass claims here.
                index.claim(candidate.slot);
                nearest.push(MatchResolution {
                    row,
                    reference: candidate.reference,
                    consumption: candidate.area,
                    method: MatchMethod::Nearest,
                });
            }
        }

        let resolved_rows: HashSet<RowId> = nearest.iter().map(|r| r.row).collect();
        resolutions.extend(nearest);

        // At-most-once across both phases.
        let mut consumed: HashSet<&str> = HashSet::new();
        for resolution in &resolutions {
            if !consumed.insert(resolution.reference.as_str()) {
                return Err(ReconcileError::DuplicateConsumption {
                    reference: resolution.reference.as_str().to_string(),
                    row: resolution.row,
                });
            }
        }

        let unmatched = leftovers
            .into_iter()
            .filter(|row| !resolved_rows.contains(&row.row))
            .map(|row| UnmatchedRow {
                row: row.row,
                item: row.item.clone(),
                material: row.material.clone(),
                timestamp: row.timestamp,
                area: row.area,
            })
            .collect();

        Ok(RunOutcome {
            resolutions,
            excluded,
            unmatched,
            anomalies,
        })
    }
}
