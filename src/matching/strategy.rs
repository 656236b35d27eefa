use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::demand::DemandRow;
use crate::core::supply::SupplyEntity;
use crate::core::types::{ExclusionEntry, MatchMethod};
use crate::ledger::LedgerIndex;
use crate::matching::outcome::MatchResolution;

/// Default strict area tolerance: effectively "identical up to rounding"
pub const DEFAULT_TIGHT_TOLERANCE: f64 = 0.001;

/// Default wide area tolerance, absorbing unit-of-measure noise
pub const DEFAULT_LOOSE_TOLERANCE: f64 = 100.0;

/// Area tolerances used by the cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tolerances {
    pub tight: f64,
    pub loose: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            tight: DEFAULT_TIGHT_TOLERANCE,
            loose: DEFAULT_LOOSE_TOLERANCE,
        }
    }
}

/// Temporal constraint a strategy places on candidate supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeRule {
    /// Supply must not precede demand
    Ordered,
    /// Same calendar day, either direction (out-of-order clearing entries)
    SameDay,
}

impl TimeRule {
    fn allows(self, demand: NaiveDateTime, supply: NaiveDateTime) -> bool {
        match self {
            Self::Ordered => supply >= demand,
            Self::SameDay => supply.date() == demand.date(),
        }
    }
}

/// What the cascade decided for one demand row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Matched(MatchResolution),
    /// Row hit the exclusion list: terminal, no consumption value
    Excluded,
    /// Row carries a reference the index cannot resolve; terminal for
    /// matching (the manual tag is trusted over any inferred source)
    ReferenceMissing { reference: String },
    /// Hand the row on to neighborhood search
    Unresolved,
}

/// Run the prioritized strategy cascade for one demand row.
///
/// Strategies are tried in priority order; the first success claims its
/// supply entity from the index immediately, so no later row (or later
/// strategy) can consume it again. A row the cascade cannot place returns
/// [`RowOutcome::Unresolved`] and falls through to neighborhood search.
pub fn apply_cascade(
    row: &DemandRow,
    index: &mut LedgerIndex,
    exclusions: &mut Vec<ExclusionEntry>,
    tolerances: &Tolerances,
) -> RowOutcome {
    // 1. Reference match: the row was already tagged by hand.
    if row.needs_reference_lookup() {
        return resolve_reference(row, index);
    }

    // 2. Tight match on linked orders.
    if let Some(slot) = scan_orders(row, index, tolerances.tight, TimeRule::Ordered) {
        return claim(row, index, slot, MatchMethod::Tight);
    }

    // 3. Loose match: same predicate, wide area tolerance.
    if let Some(slot) = scan_orders(row, index, tolerances.loose, TimeRule::Ordered) {
        return claim(row, index, slot, MatchMethod::Loose);
    }

    // 4. Cross-reference match against direct issues.
    if let Some(slot) = scan_issues(row, index, tolerances.tight) {
        return claim(row, index, slot, MatchMethod::CrossReference);
    }

    // 5. Same-day fallback for corrections posted out of order.
    if let Some(slot) = scan_orders(row, index, tolerances.tight, TimeRule::SameDay) {
        return claim(row, index, slot, MatchMethod::SameDay);
    }

    // 6. Exclusion list: the source system already rejected this movement.
    if let Some(pos) = exclusions.iter().position(|e| {
        e.item == row.item && e.qty == row.qty && row.program.as_deref() == Some(e.program.as_str())
    }) {
        exclusions.remove(pos);
        return RowOutcome::Excluded;
    }

    RowOutcome::Unresolved
}

fn resolve_reference(row: &DemandRow, index: &mut LedgerIndex) -> RowOutcome {
    let Some(reference) = row.reference.as_deref() else {
        return RowOutcome::Unresolved;
    };

    match index.lookup(reference) {
        Some(entity) if entity.is_matchable() => {
            let resolved = entity.reference();
            let Some(consumption) = entity.consumption_value() else {
                return RowOutcome::ReferenceMissing {
                    reference: reference.to_string(),
                };
            };
            index.remove(reference);
            RowOutcome::Matched(MatchResolution {
                row: row.row,
                reference: resolved,
                consumption,
                method: MatchMethod::Reference,
            })
        }
        // Present but unlinked: no magnitude to write back yet.
        Some(_) | None => RowOutcome::ReferenceMissing {
            reference: reference.to_string(),
        },
    }
}

/// First linked order matching the row on item, quantity, material and
/// area within `tolerance`, under the given time rule.
fn scan_orders(
    row: &DemandRow,
    index: &LedgerIndex,
    tolerance: f64,
    rule: TimeRule,
) -> Option<usize> {
    index.available().find_map(|(slot, entity)| {
        let SupplyEntity::Order(order) = entity else {
            return None;
        };
        let consumption = order.consumption.as_ref()?;

        let hit = order.item == row.item
            && order.qty == row.qty
            && consumption.material == row.material
            && (consumption.area - row.area).abs() < tolerance
            && rule.allows(row.timestamp, consumption.timestamp);
        hit.then_some(slot)
    })
}

/// First direct issue claimed through the row's program or ledger id.
fn scan_issues(row: &DemandRow, index: &LedgerIndex, tolerance: f64) -> Option<usize> {
    index.available().find_map(|(slot, entity)| {
        let SupplyEntity::Issue(issue) = entity else {
            return None;
        };

        let reference_hit =
            row.program.as_deref() == Some(issue.reference.as_str()) || row.id == issue.reference;
        let hit = issue.material == row.material
            && reference_hit
            && (issue.area - row.area).abs() < tolerance
            && issue.timestamp >= row.timestamp;
        hit.then_some(slot)
    })
}

fn claim(row: &DemandRow, index: &mut LedgerIndex, slot: usize, method: MatchMethod) -> RowOutcome {
    let Some(entity) = index.claim(slot) else {
        return RowOutcome::Unresolved;
    };
    let Some(consumption) = entity.consumption_value() else {
        return RowOutcome::Unresolved;
    };

    RowOutcome::Matched(MatchResolution {
        row: row.row,
        reference: entity.reference(),
        consumption,
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::supply::{ConsumptionEvent, DirectIssue, OpenOrder};
    use crate::core::types::{DocumentId, OrderId, RowId};
    use chrono::NaiveDate;

    fn ts(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn demand() -> DemandRow {
        DemandRow::new(
            RowId(2),
            "71",
            "1230055A-X1A",
            "50W-0075",
            5,
            12.0,
            ts(4, 8),
        )
    }

    fn linked_order(id: &str, area: f64, at: NaiveDateTime) -> SupplyEntity {
        SupplyEntity::Order(OpenOrder {
            order: OrderId::new(id),
            item: "1230055A-X1A".to_string(),
            qty: 5,
            consumption: Some(ConsumptionEvent {
                order: OrderId::new(id),
                material: "50W-0075".to_string(),
                timestamp: at,
                area,
            }),
        })
    }

    fn issue(doc: &str, reference: &str, area: f64, at: NaiveDateTime) -> SupplyEntity {
        SupplyEntity::Issue(DirectIssue {
            document: DocumentId::new(doc),
            reference: reference.to_string(),
            material: "50W-0075".to_string(),
            timestamp: at,
            area,
        })
    }

    fn run(row: &DemandRow, index: &mut LedgerIndex) -> RowOutcome {
        apply_cascade(row, index, &mut Vec::new(), &Tolerances::default())
    }

    #[test]
    fn test_tight_match_within_epsilon() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30012345", 12.0007, ts(4, 9)));

        match run(&demand(), &mut index) {
            RowOutcome::Matched(res) => {
                assert_eq!(res.method, MatchMethod::Tight);
                assert_eq!(res.reference.as_str(), "30012345");
                assert!((res.consumption - 12.0007).abs() < f64::EPSILON);
            }
            other => panic!("expected tight match, got {other:?}"),
        }
        assert!(index.is_empty());
    }

    #[test]
    fn test_loose_match_catches_unit_noise() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30012345", 60.0, ts(4, 9)));

        match run(&demand(), &mut index) {
            RowOutcome::Matched(res) => assert_eq!(res.method, MatchMethod::Loose),
            other => panic!("expected loose match, got {other:?}"),
        }
    }

    #[test]
    fn test_supply_before_demand_not_matched_ordered() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30012345", 12.0, ts(3, 9)));

        // Previous day: neither tight/loose (ordered) nor same-day apply.
        assert_eq!(run(&demand(), &mut index), RowOutcome::Unresolved);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_same_day_fallback_accepts_earlier_posting() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30012345", 12.0, ts(4, 6)));

        match run(&demand(), &mut index) {
            RowOutcome::Matched(res) => assert_eq!(res.method, MatchMethod::SameDay),
            other => panic!("expected same-day match, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_reference_by_program() {
        let mut index = LedgerIndex::new();
        index.insert(issue("4900000123", "20231", 12.0, ts(4, 9)));

        let row = demand().with_program("20231");
        match run(&row, &mut index) {
            RowOutcome::Matched(res) => {
                assert_eq!(res.method, MatchMethod::CrossReference);
                assert_eq!(res.reference.as_str(), "4900000123");
            }
            other => panic!("expected cross-reference match, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_reference_by_ledger_id() {
        let mut index = LedgerIndex::new();
        index.insert(issue("4900000123", "71", 12.0, ts(4, 9)));

        match run(&demand(), &mut index) {
            RowOutcome::Matched(res) => assert_eq!(res.method, MatchMethod::CrossReference),
            other => panic!("expected cross-reference match, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_lookup_resolves_directly() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30012345", 11.5, ts(4, 9)));

        let row = demand().with_reference("30012345");
        match run(&row, &mut index) {
            RowOutcome::Matched(res) => {
                assert_eq!(res.method, MatchMethod::Reference);
                assert!((res.consumption - 11.5).abs() < f64::EPSILON);
            }
            other => panic!("expected reference match, got {other:?}"),
        }
        assert!(index.is_empty());
    }

    #[test]
    fn test_reference_lookup_miss_is_terminal() {
        let mut index = LedgerIndex::new();
        // A perfectly good tight candidate is present, but the manual tag
        // points elsewhere; the row must not silently re-match.
        index.insert(linked_order("30012345", 12.0, ts(4, 9)));

        let row = demand().with_reference("30099999");
        assert_eq!(
            run(&row, &mut index),
            RowOutcome::ReferenceMissing {
                reference: "30099999".to_string()
            }
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_exclusion_match_consumes_entry() {
        let mut index = LedgerIndex::new();
        let mut exclusions = vec![ExclusionEntry {
            item: "1230055A-X1A".to_string(),
            reference: "D-1230055-10001".to_string(),
            qty: 5,
            program: "20231".to_string(),
        }];

        let row = demand().with_program("20231");
        let outcome = apply_cascade(&row, &mut index, &mut exclusions, &Tolerances::default());
        assert_eq!(outcome, RowOutcome::Excluded);
        assert!(exclusions.is_empty());

        // Entry consumed: a second identical row stays unresolved.
        let outcome = apply_cascade(&row, &mut index, &mut exclusions, &Tolerances::default());
        assert_eq!(outcome, RowOutcome::Unresolved);
    }

    #[test]
    fn test_priority_tight_beats_loose_candidate() {
        let mut index = LedgerIndex::new();
        index.insert(linked_order("30011111", 60.0, ts(4, 9)));
        index.insert(linked_order("30022222", 12.0, ts(4, 10)));

        match run(&demand(), &mut index) {
            RowOutcome::Matched(res) => {
                assert_eq!(res.method, MatchMethod::Tight);
                assert_eq!(res.reference.as_str(), "30022222");
            }
            other => panic!("expected tight match, got {other:?}"),
        }
    }

    #[test]
    fn test_unlinked_order_not_scanned() {
        let mut index = LedgerIndex::new();
        index.insert(SupplyEntity::Order(OpenOrder {
            order: OrderId::new("30012345"),
            item: "1230055A-X1A".to_string(),
            qty: 5,
            consumption: None,
        }));

        assert_eq!(run(&demand(), &mut index), RowOutcome::Unresolved);
    }
}
