use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::types::{LedgerKind, MatchMethod, OrderId, ResolvedReference, RowId};

/// One accepted match, ready for write-back into the demand ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResolution {
    pub row: RowId,
    pub reference: ResolvedReference,
    /// Consumed magnitude taken from the supply side
    pub consumption: f64,
    pub method: MatchMethod,
}

/// A demand row left unresolved after both matching phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRow {
    pub row: RowId,
    pub item: String,
    pub material: String,
    pub timestamp: NaiveDateTime,
    pub area: f64,
}

/// Recoverable oddities accumulated over a run and surfaced once at the
/// end; none of these interrupt the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Consumption event with no production receipt in this load window
    OrphanedConsumption {
        order: OrderId,
        material: String,
        timestamp: NaiveDateTime,
        area: f64,
    },
    /// Demand row carries a reference the index cannot resolve
    ReferenceNotFound { row: RowId, reference: String },
    /// Row excluded from matching because a field would not parse
    MalformedRow {
        ledger: LedgerKind,
        line: u64,
        message: String,
    },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedConsumption {
                order,
                material,
                timestamp,
                area,
            } => write!(
                f,
                "orphaned consumption: order {order}, material {material}, {timestamp}, {area:.3}"
            ),
            Self::ReferenceNotFound { row, reference } => {
                write!(f, "row {row}: reference {reference} not found in supply ledger")
            }
            Self::MalformedRow {
                ledger,
                line,
                message,
            } => write!(f, "{ledger} ledger line {line}: {message}"),
        }
    }
}

/// Everything one reconciliation run produced
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    pub resolutions: Vec<MatchResolution>,
    /// Rows matched against the exclusion list: terminal, no consumption
    pub excluded: Vec<RowId>,
    pub unmatched: Vec<UnmatchedRow>,
    pub anomalies: Vec<Anomaly>,
}

impl RunOutcome {
    /// Earliest and latest timestamp among unresolved rows, the window a
    /// follow-up supply-ledger pull has to cover.
    #[must_use]
    pub fn unmatched_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let earliest = self.unmatched.iter().map(|u| u.timestamp).min()?;
        let latest = self.unmatched.iter().map(|u| u.timestamp).max()?;
        Some((earliest, latest))
    }

    /// Sorted, de-duplicated item and material keys of the unresolved
    /// rows, for the follow-up query.
    #[must_use]
    pub fn follow_up_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .unmatched
            .iter()
            .flat_map(|u| [u.item.clone(), u.material.clone()])
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}
