use std::collections::HashMap;

use crate::core::supply::SupplyEntity;

/// In-memory store of all supply entities, addressable by every
/// identifier a demand row can reference (order id, document id,
/// alternate reference id).
///
/// The index is the single arbiter of the at-most-once consumption
/// invariant: a matched entity is removed immediately, under all of its
/// keys, and can never resolve a second row. Lifecycle is bounded to one
/// reconciliation run; a re-run needs a freshly built index.
#[derive(Debug, Default)]
pub struct LedgerIndex {
    /// Slot storage; consumed entities leave a `None` behind so slot ids
    /// stay stable for the duration of a run
    slots: Vec<Option<SupplyEntity>>,
    key_to_slot: HashMap<String, usize>,
}

impl LedgerIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, indexing it under all of its lookup keys.
    ///
    /// A key collision evicts the previously stored entity (last wins,
    /// matching how repeated ledger exports overwrite earlier rows).
    pub fn insert(&mut self, entity: SupplyEntity) {
        for key in entity.lookup_keys() {
            if self.key_to_slot.contains_key(&key) {
                self.remove(&key);
            }
        }

        let slot = self.slots.len();
        for key in entity.lookup_keys() {
            self.key_to_slot.insert(key, slot);
        }
        self.slots.push(Some(entity));
    }

    pub fn lookup(&self, key: &str) -> Option<&SupplyEntity> {
        let slot = *self.key_to_slot.get(key)?;
        self.slots[slot].as_ref()
    }

    /// Remove the entity stored under `key`, under all of its keys.
    ///
    /// Idempotent: removing an absent key is a no-op, because earlier
    /// strategies may already have claimed the same entity.
    pub fn remove(&mut self, key: &str) -> Option<SupplyEntity> {
        let slot = self.key_to_slot.get(key).copied()?;
        self.claim(slot)
    }

    /// Take the entity in `slot`, dropping every key that pointed at it.
    pub fn claim(&mut self, slot: usize) -> Option<SupplyEntity> {
        let entity = self.slots.get_mut(slot)?.take()?;
        for key in entity.lookup_keys() {
            self.key_to_slot.remove(&key);
        }
        Some(entity)
    }

    /// All unconsumed entities with their slot ids, in insertion order.
    pub fn available(&self) -> impl Iterator<Item = (usize, &SupplyEntity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.as_ref().map(|e| (slot, e)))
    }

    /// Number of unconsumed entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|e| e.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
