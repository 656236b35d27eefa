use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::core::demand::DemandRow;
use crate::core::distance::Distance;
use crate::core::types::{NeighborhoodKey, ResolvedReference, RowId};
use crate::ledger::LedgerIndex;

/// A supply entity flattened into the fields neighborhood search needs,
/// plus its index slot for the claim at application time.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyCandidate {
    pub slot: usize,
    pub reference: ResolvedReference,
    pub timestamp: NaiveDateTime,
    pub area: f64,
}

#[derive(Debug, Clone)]
struct DemandCell {
    row: RowId,
    timestamp: NaiveDateTime,
    area: f64,
}

/// One equivalence class of rows and supply entities sharing
/// `(item, qty, material)`, with the demand x supply distance matrix.
///
/// Ephemeral: built fresh per matching pass, drained by [`Self::extract`],
/// then discarded.
#[derive(Debug)]
pub struct Neighborhood {
    pub key: NeighborhoodKey,
    demand: Vec<DemandCell>,
    supply: Vec<SupplyCandidate>,
    /// `matrix[d][s]` = distance from demand `d` to supply `s`
    matrix: Vec<Vec<Distance>>,
}

impl Neighborhood {
    #[must_use]
    pub fn new(key: NeighborhoodKey) -> Self {
        Self {
            key,
            demand: Vec::new(),
            supply: Vec::new(),
            matrix: Vec::new(),
        }
    }

    pub fn add_demand(&mut self, row: &DemandRow) {
        let cell = DemandCell {
            row: row.row,
            timestamp: row.timestamp,
            area: row.area,
        };
        let distances = self
            .supply
            .iter()
            .map(|s| Distance::between(cell.timestamp, cell.area, s.timestamp, s.area))
            .collect();
        self.demand.push(cell);
        self.matrix.push(distances);
    }

    pub fn add_supply(&mut self, candidate: SupplyCandidate) {
        for (cell, distances) in self.demand.iter().zip(self.matrix.iter_mut()) {
            distances.push(Distance::between(
                cell.timestamp,
                cell.area,
                candidate.timestamp,
                candidate.area,
            ));
        }
        self.supply.push(candidate);
    }

    #[must_use]
    pub fn demand_len(&self) -> usize {
        self.demand.len()
    }

    #[must_use]
    pub fn supply_len(&self) -> usize {
        self.supply.len()
    }

    /// Position of the minimum finite distance in the matrix.
    ///
    /// The scan runs demand-major in insertion order and replaces the
    /// running minimum only on strict dominance, so the first-encountered
    /// cell wins every inconclusive comparison. Infinite cells (supply
    /// preceding demand) are never candidates.
    fn minimum(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;

        for (d, distances) in self.matrix.iter().enumerate() {
            for (s, dist) in distances.iter().enumerate() {
                if !dist.is_finite() {
                    continue;
                }
                match best {
                    None => best = Some((d, s)),
                    Some((bd, bs)) => {
                        if dist.dominates(&self.matrix[bd][bs]) {
                            best = Some((d, s));
                        }
                    }
                }
            }
        }

        best
    }

    /// Accept the current minimum-distance pair and delete its row and
    /// column from the matrix. Returns `None` once no finite-distance
    /// pair remains; whatever is left stays unresolved this pass.
    pub fn extract(&mut self) -> Option<(RowId, SupplyCandidate)> {
        let (d, s) = self.minimum()?;

        let cell = self.demand.remove(d);
        self.matrix.remove(d);
        let candidate = self.supply.remove(s);
        for distances in &mut self.matrix {
            distances.remove(s);
        }

        Some((cell.row, candidate))
    }
}

/// Partition unresolved demand rows and the still-available supply
/// entities into neighborhoods.
///
/// Entities without a full partition key (direct issues, unlinked orders)
/// and buckets with no counterpart on the other side simply take no part
/// in this pass; they may pair up in a future load window.
pub fn partition(rows: &[&DemandRow], index: &LedgerIndex) -> Vec<Neighborhood> {
    let mut neighborhoods: Vec<Neighborhood> = Vec::new();
    let mut by_key: HashMap<NeighborhoodKey, usize> = HashMap::new();

    for row in rows {
        let key = row.neighborhood_key();
        let at = *by_key.entry(key.clone()).or_insert_with(|| {
            neighborhoods.push(Neighborhood::new(key));
            neighborhoods.len() - 1
        });
        neighborhoods[at].add_demand(row);
    }

    for (slot, entity) in index.available() {
        let Some(key) = entity.neighborhood_key() else {
            continue;
        };
        let Some(&at) = by_key.get(&key) else {
            continue;
        };
        // Matchability is implied by a present neighborhood key.
        let (Some(timestamp), Some(area)) = (entity.timestamp(), entity.consumption_value())
        else {
            continue;
        };
        neighborhoods[at].add_supply(SupplyCandidate {
            slot,
            reference: entity.reference(),
            timestamp,
            area,
        });
    }

    neighborhoods
}
