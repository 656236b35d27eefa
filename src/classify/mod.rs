//! Movement-row classification.
//!
//! Every supply-ledger row carries a movement-type code; a closed decision
//! table turns the row into one of four typed outcomes. Unit conversion and
//! sign normalization happen here, once, so downstream phases only ever see
//! positive canonical-square-inch magnitudes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::supply::{ConsumptionEvent, DirectIssue, OpenOrder};
use crate::core::types::{DocumentId, OrderId};
use crate::utils::normalize::SQUARE_INCHES_PER_SQUARE_FOOT;

/// Storage location that marks a receipt as a production-floor receipt
pub const PRODUCTION_LOCATION: &str = "PROD";

/// Movement-type code of a supply-ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// 101: goods receipt from production
    ProductionReceipt,
    /// 201: issue to cost center
    CostCenterIssue,
    /// 221: issue to project
    ProjectIssue,
    /// 261: issue to production order
    OrderIssue,
    /// Any other code; outside the reconciled domain
    Other(String),
}

impl MovementType {
    /// Parse a movement-type code. Unknown codes map to [`Self::Other`],
    /// never to an error.
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "101" => Self::ProductionReceipt,
            "201" => Self::CostCenterIssue,
            "221" => Self::ProjectIssue,
            "261" => Self::OrderIssue,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Unit-of-entry of a supply-ledger quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryUnit {
    /// Piece count; never a consumable area
    Each,
    /// Square feet; converted to canonical square inches
    SquareFeet,
    /// Canonical area unit
    SquareInches,
    Other(String),
}

impl EntryUnit {
    pub fn parse(unit: &str) -> Self {
        match unit.trim().to_uppercase().as_str() {
            "EA" => Self::Each,
            "FT2" => Self::SquareFeet,
            "IN2" => Self::SquareInches,
            other => Self::Other(other.to_string()),
        }
    }

    /// Is this a piece count rather than a measurable magnitude?
    pub fn is_item_count(&self) -> bool {
        matches!(self, Self::Each)
    }
}

/// One raw supply-ledger row, fields already normalized to canonical
/// string/number form by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMovement {
    pub document: DocumentId,
    pub movement_type: MovementType,
    pub material: String,
    /// Signed quantity in the entry unit; negative for consumptions
    pub qty: f64,
    pub unit: EntryUnit,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// Outcome of classifying one movement row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classified {
    Order(OpenOrder),
    Consumption(ConsumptionEvent),
    Issue(DirectIssue),
    /// Outside the reconciled domain; a named outcome, not an error
    Ignored,
}

/// Convert a signed entry-unit quantity into a positive consumed
/// magnitude in canonical square inches.
fn consumed_area(qty: f64, unit: &EntryUnit) -> f64 {
    let canonical = match unit {
        EntryUnit::SquareFeet => qty * SQUARE_INCHES_PER_SQUARE_FOOT,
        _ => qty,
    };
    // Consumptions post negative in the source ledger.
    -canonical
}

/// Classify one supply-ledger row.
///
/// The decision table is closed: every movement lands in exactly one of
/// the four [`Classified`] variants, and reclassifying the same row always
/// produces the same result.
pub fn classify(movement: &RawMovement) -> Classified {
    match &movement.movement_type {
        MovementType::ProductionReceipt => {
            if movement.location != PRODUCTION_LOCATION {
                return Classified::Ignored;
            }
            let Some(order) = &movement.order else {
                return Classified::Ignored;
            };
            Classified::Order(OpenOrder {
                order: order.clone(),
                item: movement.material.clone(),
                qty: movement.qty.round() as i64,
                consumption: None,
            })
        }
        MovementType::CostCenterIssue | MovementType::ProjectIssue => {
            let Some(reference) = &movement.reference else {
                return Classified::Ignored;
            };
            Classified::Issue(DirectIssue {
                document: movement.document.clone(),
                reference: reference.clone(),
                material: movement.material.clone(),
                timestamp: movement.timestamp,
                area: consumed_area(movement.qty, &movement.unit),
            })
        }
        MovementType::OrderIssue => {
            if movement.unit.is_item_count() {
                return Classified::Ignored;
            }
            let Some(order) = &movement.order else {
                return Classified::Ignored;
            };
            Classified::Consumption(ConsumptionEvent {
                order: order.clone(),
                material: movement.material.clone(),
                timestamp: movement.timestamp,
                area: consumed_area(movement.qty, &movement.unit),
            })
        }
        MovementType::Other(_) => Classified::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn movement(code: &str) -> RawMovement {
        RawMovement {
            document: DocumentId::new("4900000123"),
            movement_type: MovementType::parse(code),
            material: "50W-0075".to_string(),
            qty: -12.0,
            unit: EntryUnit::SquareInches,
            location: "MAIN".to_string(),
            order: Some(OrderId::new("30012345")),
            reference: Some("71".to_string()),
            timestamp: ts(),
        }
    }

    #[test]
    fn test_movement_type_table() {
        assert_eq!(MovementType::parse("101"), MovementType::ProductionReceipt);
        assert_eq!(MovementType::parse("201"), MovementType::CostCenterIssue);
        assert_eq!(MovementType::parse("221"), MovementType::ProjectIssue);
        assert_eq!(MovementType::parse("261"), MovementType::OrderIssue);
        assert_eq!(
            MovementType::parse("311"),
            MovementType::Other("311".to_string())
        );
    }

    #[test]
    fn test_production_receipt_at_prod() {
        let mut m = movement("101");
        m.location = PRODUCTION_LOCATION.to_string();
        m.qty = 5.0;

        match classify(&m) {
            Classified::Order(o) => {
                assert_eq!(o.order.as_str(), "30012345");
                assert_eq!(o.item, "50W-0075");
                assert_eq!(o.qty, 5);
                assert!(o.consumption.is_none());
            }
            other => panic!("expected order, got {other:?}"),
        }
    }

    #[test]
    fn test_production_receipt_elsewhere_ignored() {
        let mut m = movement("101");
        m.qty = 5.0;
        assert_eq!(classify(&m), Classified::Ignored);
    }

    #[test]
    fn test_cost_center_issue_negates_area() {
        let m = movement("201");
        match classify(&m) {
            Classified::Issue(i) => {
                assert_eq!(i.document.as_str(), "4900000123");
                assert_eq!(i.reference, "71");
                assert!((i.area - 12.0).abs() < f64::EPSILON);
            }
            other => panic!("expected issue, got {other:?}"),
        }
    }

    #[test]
    fn test_project_issue_without_reference_ignored() {
        let mut m = movement("221");
        m.reference = None;
        assert_eq!(classify(&m), Classified::Ignored);
    }

    #[test]
    fn test_order_issue_converts_square_feet() {
        let mut m = movement("261");
        m.unit = EntryUnit::SquareFeet;
        m.qty = -2.0;

        match classify(&m) {
            Classified::Consumption(c) => {
                assert_eq!(c.order.as_str(), "30012345");
                assert!((c.area - 288.0).abs() < f64::EPSILON);
            }
            other => panic!("expected consumption, got {other:?}"),
        }
    }

    #[test]
    fn test_order_issue_in_pieces_ignored() {
        let mut m = movement("261");
        m.unit = EntryUnit::Each;
        assert_eq!(classify(&m), Classified::Ignored);
    }

    #[test]
    fn test_unknown_code_ignored() {
        assert_eq!(classify(&movement("311")), Classified::Ignored);
    }

    #[test]
    fn test_reclassification_idempotent() {
        let m = movement("261");
        assert_eq!(classify(&m), classify(&m));
    }
}
