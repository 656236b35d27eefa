use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::types::{DocumentId, NeighborhoodKey, OrderId, ResolvedReference};

/// Raw-material consumption posted against a production order.
///
/// Carries the material, timing and magnitude of the movement; the owning
/// order contributes the part key and piece count once linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionEvent {
    pub order: OrderId,
    pub material: String,
    pub timestamp: NaiveDateTime,
    /// Consumed magnitude, canonical square inches, already negated positive
    pub area: f64,
}

/// A production receipt waiting for (or holding) its raw consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order: OrderId,
    pub item: String,
    pub qty: i64,
    /// `None` until the linker attaches the matching consumption event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionEvent>,
}

/// Material issued straight to a cost center or project; fully resolved
/// at classification time, no linking step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectIssue {
    pub document: DocumentId,
    /// Alternate reference id the demand side may point at
    pub reference: String,
    pub material: String,
    pub timestamp: NaiveDateTime,
    pub area: f64,
}

/// A classified supply-ledger movement that can satisfy a demand row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyEntity {
    Order(OpenOrder),
    Issue(DirectIssue),
}

impl SupplyEntity {
    /// All identifiers demand rows can reference this entity by.
    ///
    /// Removing the entity under any one of them removes it under all.
    pub fn lookup_keys(&self) -> Vec<String> {
        match self {
            Self::Order(o) => vec![o.order.as_str().to_string()],
            Self::Issue(i) => {
                let mut keys = vec![i.document.as_str().to_string()];
                if !i.reference.is_empty() && i.reference != i.document.as_str() {
                    keys.push(i.reference.clone());
                }
                keys
            }
        }
    }

    /// Reference written back when this entity resolves a row
    pub fn reference(&self) -> ResolvedReference {
        match self {
            Self::Order(o) => ResolvedReference::Order(o.order.clone()),
            Self::Issue(i) => ResolvedReference::Document(i.document.clone()),
        }
    }

    /// Consumption magnitude, if the entity is matchable yet
    pub fn consumption_value(&self) -> Option<f64> {
        match self {
            Self::Order(o) => o.consumption.as_ref().map(|c| c.area),
            Self::Issue(i) => Some(i.area),
        }
    }

    /// Posting timestamp of the movement, if known yet
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Order(o) => o.consumption.as_ref().map(|c| c.timestamp),
            Self::Issue(i) => Some(i.timestamp),
        }
    }

    /// An open order only becomes matchable once its consumption is
    /// linked; a direct issue is matchable from creation.
    pub fn is_matchable(&self) -> bool {
        match self {
            Self::Order(o) => o.consumption.is_some(),
            Self::Issue(_) => true,
        }
    }

    /// Partition key for nearest-neighbor search.
    ///
    /// Only linked orders carry the full item/quantity/material key;
    /// direct issues never enter neighborhoods.
    pub fn neighborhood_key(&self) -> Option<NeighborhoodKey> {
        match self {
            Self::Order(o) => o.consumption.as_ref().map(|c| NeighborhoodKey {
                item: o.item.clone(),
                qty: o.qty,
                material: c.material.clone(),
            }),
            Self::Issue(_) => None,
        }
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

    fn open_order() -> OpenOrder {
        OpenOrder {
            order: OrderId::new("30012345"),
            item: "1230055A-X1A".to_string(),
            qty: 5,
            consumption: None,
        }
    }

    fn consumption() -> ConsumptionEvent {
        ConsumptionEvent {
            order: OrderId::new("30012345"),
            material: "50W-0075".to_string(),
            timestamp: ts(),
            area: 12.0,
        }
    }

    #[test]
    fn test_unlinked_order_not_matchable() {
        let entity = SupplyEntity::Order(open_order());
        assert!(!entity.is_matchable());
        assert_eq!(entity.consumption_value(), None);
        assert_eq!(entity.timestamp(), None);
        assert_eq!(entity.neighborhood_key(), None);
    }

    #[test]
    fn test_linked_order_matchable() {
        let mut order = open_order();
        order.consumption = Some(consumption());
        let entity = SupplyEntity::Order(order);

        assert!(entity.is_matchable());
        assert_eq!(entity.consumption_value(), Some(12.0));
        let key = entity.neighborhood_key().unwrap();
        assert_eq!(key.item, "1230055A-X1A");
        assert_eq!(key.material, "50W-0075");
    }

    #[test]
    fn test_issue_matchable_immediately() {
        let entity = SupplyEntity::Issue(DirectIssue {
            document: DocumentId::new("4900000123"),
            reference: "71".to_string(),
            material: "50W-0075".to_string(),
            timestamp: ts(),
            area: 8.25,
        });

        assert!(entity.is_matchable());
        assert_eq!(entity.consumption_value(), Some(8.25));
        assert_eq!(entity.neighborhood_key(), None);
        assert_eq!(
            entity.lookup_keys(),
            vec!["4900000123".to_string(), "71".to_string()]
        );
    }

    #[test]
    fn test_issue_duplicate_reference_deduped() {
        let entity = SupplyEntity::Issue(DirectIssue {
            document: DocumentId::new("4900000123"),
            reference: "4900000123".to_string(),
            material: "50W-0075".to_string(),
            timestamp: ts(),
            area: 8.25,
        });
        assert_eq!(entity.lookup_keys(), vec!["4900000123".to_string()]);
    }

    #[test]
    fn test_order_reference() {
        let mut order = open_order();
        order.consumption = Some(consumption());
        let entity = SupplyEntity::Order(order);
        assert_eq!(entity.reference().as_str(), "30012345");
    }
}
