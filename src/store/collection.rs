//! Collection implementation
//!
//! Id-keyed map plus the display order for one entity kind.

use std::collections::{HashMap, HashSet};

use crate::model::{Entity, EntityId};

/// Records of one kind, keyed by id, with an independent display order
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T: Entity> {
    records: HashMap<EntityId, T>,
    order: Vec<EntityId>,
}

impl<T: Entity> Collection<T> {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build from a batch, first occurrence of an id fixing its position
    pub fn from_records(records: Vec<T>) -> Self {
        let mut collection = Self::new();
        collection.replace(records);
        collection
    }

    /// Rebuild from persisted pairs and order
    ///
    /// Pairs whose key disagrees with the record's own id are ignored. Order
    /// entries with no record are dropped; records missing from the order
    /// are appended in pair order.
    pub fn from_parts(pairs: Vec<(EntityId, T)>, order: Option<Vec<EntityId>>) -> Self {
        let mut records = HashMap::with_capacity(pairs.len());
        let mut pair_order = Vec::with_capacity(pairs.len());
        for (id, record) in pairs {
            if record.id() != id {
                continue;
            }
            if records.insert(id, record).is_none() {
                pair_order.push(id);
            }
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut ids: Vec<EntityId> = order
            .unwrap_or_default()
            .into_iter()
            .filter(|id| records.contains_key(id) && seen.insert(*id))
            .collect();
        ids.extend(pair_order.into_iter().filter(|id| seen.insert(*id)));

        Self { records, order: ids }
    }

    /// Make `records` the complete contents
    ///
    /// 1. Purge ids absent from `records`
    /// 2. Insert or overwrite every record (last duplicate wins)
    /// 3. Set the order to the batch order
    ///
    /// Returns the number of purged ids.
    pub fn replace(&mut self, records: Vec<T>) -> usize {
        let incoming: HashSet<EntityId> = records.iter().map(Entity::id).collect();

        let before = self.records.len();
        self.records.retain(|id, _| incoming.contains(id));
        let purged = before - self.records.len();

        let mut seen = HashSet::with_capacity(incoming.len());
        let mut order = Vec::with_capacity(incoming.len());
        for record in records {
            let id = record.id();
            if seen.insert(id) {
                order.push(id);
            }
            self.records.insert(id, record);
        }
        self.order = order;

        purged
    }

    /// O(1) lookup; `None` for any unknown id
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.records.get(&id)
    }

    /// Records in display order, skipping order entries that do not resolve
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Owned copy of `iter()`
    pub fn list(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// The ordered id sequence
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// `(id, record)` pairs in display order
    pub fn pairs(&self) -> Vec<(EntityId, &T)> {
        self.iter().map(|record| (record.id(), record)).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}
