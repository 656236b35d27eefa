use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::types::{NeighborhoodKey, RowId};

/// One row of the demand ledger: an expected consumption that still needs
/// a resolved supply source.
///
/// Rows are created once per ledger load and only ever transition forward
/// (to resolved or excluded); the matching phases never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRow {
    /// Stable position in the demand ledger, used for write-back
    pub row: RowId,

    /// Ledger id column (canonical string form)
    pub id: String,

    /// Part key, uppercased at load
    pub item: String,

    /// Material master key
    pub material: String,

    /// Expected piece count
    pub qty: i64,

    /// Consumed magnitude in canonical square inches
    pub area: f64,

    /// When the demand was recorded
    pub timestamp: NaiveDateTime,

    /// Declared program, if the source tagged one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Order/document reference, present when the row was manually tagged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Consumption value already written back by a previous run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_value: Option<f64>,
}

impl DemandRow {
    pub fn new(
        row: RowId,
        id: impl Into<String>,
        item: impl Into<String>,
        material: impl Into<String>,
        qty: i64,
        area: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            row,
            id: id.into(),
            item: item.into().to_uppercase(),
            material: material.into(),
            qty,
            area,
            timestamp,
            program: None,
            reference: None,
            known_value: None,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn with_known_value(mut self, value: f64) -> Self {
        self.known_value = Some(value);
        self
    }

    /// Partition key for nearest-neighbor search
    #[must_use]
    pub fn neighborhood_key(&self) -> NeighborhoodKey {
        NeighborhoodKey {
            item: self.item.clone(),
            qty: self.qty,
            material: self.material.clone(),
        }
    }

    /// A row that already carries a consumption value needs nothing from
    /// this run; its supply entity (if referenced) is claimed up front so
    /// no other row can match it.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.known_value.is_some()
    }

    /// A row tagged with a reference but no value resolves by direct
    /// index lookup instead of matching.
    #[must_use]
    pub fn needs_reference_lookup(&self) -> bool {
        self.reference.is_some() && self.known_value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_item_uppercased() {
        let row = DemandRow::new(RowId(2), "71", "1230055a-x1a", "50W-0075", 5, 12.0, ts(8));
        assert_eq!(row.item, "1230055A-X1A");
    }

    #[test]
    fn test_neighborhood_key() {
        let row = DemandRow::new(RowId(2), "71", "1230055A-X1A", "50W-0075", 5, 12.0, ts(8));
        let key = row.neighborhood_key();
        assert_eq!(key.item, "1230055A-X1A");
        assert_eq!(key.qty, 5);
        assert_eq!(key.material, "50W-0075");
    }

    #[test]
    fn test_settled_and_lookup_states() {
        let fresh = DemandRow::new(RowId(2), "71", "A", "M", 1, 1.0, ts(8));
        assert!(!fresh.is_settled());
        assert!(!fresh.needs_reference_lookup());

        let tagged = fresh.clone().with_reference("30012345");
        assert!(!tagged.is_settled());
        assert!(tagged.needs_reference_lookup());

        let settled = tagged.with_known_value(12.5);
        assert!(settled.is_settled());
        assert!(!settled.needs_reference_lookup());
    }
}
