use std::collections::HashMap;

use tracing::warn;

use crate::classify::Classified;
use crate::core::supply::{ConsumptionEvent, DirectIssue, OpenOrder, SupplyEntity};
use crate::ledger::index::LedgerIndex;
use crate::ledger::LedgerError;

/// Accumulates classified movements and produces the linked [`LedgerIndex`].
///
/// Orders and their consumption events arrive as independent ledger rows;
/// the builder merges them by order key once the whole batch is in. A late
/// consumption whose production receipt fell outside the load window is an
/// orphan: reported, never silently dropped, never fatal.
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    orders: Vec<OpenOrder>,
    order_slots: HashMap<String, usize>,
    events: Vec<ConsumptionEvent>,
    issues: Vec<DirectIssue>,
    ignored: usize,
}

/// Result of building the supply side of a run
#[derive(Debug)]
pub struct LinkedLedger {
    pub index: LedgerIndex,
    /// Consumption events with no owning order in this load window
    pub orphans: Vec<ConsumptionEvent>,
    /// Movements outside the reconciled domain
    pub ignored: usize,
}

impl LedgerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, classified: Classified) {
        match classified {
            Classified::Order(order) => {
                let key = order.order.as_str().to_string();
                match self.order_slots.get(&key) {
                    // Repeated receipt for the same order: last wins.
                    Some(&slot) => self.orders[slot] = order,
                    None => {
                        self.order_slots.insert(key, self.orders.len());
                        self.orders.push(order);
                    }
                }
            }
            Classified::Consumption(event) => self.events.push(event),
            Classified::Issue(issue) => self.issues.push(issue),
            Classified::Ignored => self.ignored += 1,
        }
    }

    /// Link consumption events into their owning orders and build the index.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ConsumptionAlreadyLinked`] if two events claim
    /// the same order, an upstream data defect that must abort the run
    /// rather than silently overwrite a linked consumption.
    pub fn finish(mut self) -> Result<LinkedLedger, LedgerError> {
        let mut orphans = Vec::new();

        for event in std::mem::take(&mut self.events) {
            match self.order_slots.get(event.order.as_str()) {
                Some(&slot) => {
                    let order = &mut self.orders[slot];
                    if order.consumption.is_some() {
                        return Err(LedgerError::ConsumptionAlreadyLinked {
                            order: event.order,
                        });
                    }
                    order.consumption = Some(event);
                }
                None => {
                    warn!(order = %event.order, material = %event.material,
                        "no production receipt for consumption event");
                    orphans.push(event);
                }
            }
        }

        let mut index = LedgerIndex::new();
        for order in self.orders {
            index.insert(SupplyEntity::Order(order));
        }
        for issue in self.issues {
            index.insert(SupplyEntity::Issue(issue));
        }

        Ok(LinkedLedger {
            index,
            orphans,
            ignored: self.ignored,
        })
    }
}
