//! Territory storage.
//!
//! Holds the current territory set and applies conquer results the way a
//! persistence layer would:
//! - upsert the new territory
//! - replace modified territories by id
//! - delete consumed territories

use std::collections::HashMap;

use crate::{Bounds, ConquerResult, Territory};

/// In-memory territory set keyed by territory id.
#[derive(Debug, Default)]
pub struct TerritoryStore {
    territories: HashMap<String, Territory>,
}

impl TerritoryStore {
    /// Create a new empty territory store.
    pub fn new() -> Self {
        Self {
            territories: HashMap::new(),
        }
    }

    /// Insert or replace a territory.
    ///
    /// Returns the bounds of its exterior ring.
    pub fn upsert(&mut self, territory: Territory) -> Option<Bounds> {
        let bounds = territory.bounds();
        self.territories.insert(territory.id.clone(), territory);
        bounds
    }

    /// Apply a conquer result. Returns the number of territories written.
    pub fn apply(&mut self, result: &ConquerResult<'_>) -> usize {
        let mut writes = 0;

        self.upsert(result.new_territory.clone());
        writes += 1;

        for modified in &result.modified_territories {
            self.upsert(modified.clone());
            writes += 1;
        }

        for id in &result.deleted_territory_ids {
            if self.territories.remove(id).is_some() {
                writes += 1;
            }
        }

        writes
    }

    /// Remove a territory by ID.
    pub fn remove(&mut self, id: &str) -> Option<Territory> {
        self.territories.remove(id)
    }

    /// Clear all territories.
    pub fn clear(&mut self) {
        self.territories.clear();
    }

    /// Get a territory by ID.
    pub fn get(&self, id: &str) -> Option<&Territory> {
        self.territories.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Territory> {
        self.territories.get_mut(id)
    }

    /// Check if a territory exists.
    pub fn contains(&self, id: &str) -> bool {
        self.territories.contains_key(id)
    }

    /// Get all territories as values.
    pub fn values(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Territories owned by a user, oldest claim first.
    pub fn for_owner(&self, owner_id: &str) -> Vec<&Territory> {
        let mut owned: Vec<&Territory> = self
            .territories
            .values()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        sort_by_claim(&mut owned);
        owned
    }

    /// Clone the given territories, oldest claim first.
    ///
    /// Unknown ids are ignored.
    pub fn snapshot(&self, ids: &[String]) -> Vec<Territory> {
        let mut selected: Vec<&Territory> =
            ids.iter().filter_map(|id| self.territories.get(id)).collect();
        sort_by_claim(&mut selected);
        selected.into_iter().cloned().collect()
    }

    /// Get the number of territories.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Number of distinct owners.
    pub fn owner_count(&self) -> usize {
        let mut owners: Vec<&str> = self.territories.values().map(|t| t.owner_id.as_str()).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.len()
    }
}

fn sort_by_claim(territories: &mut [&Territory]) {
    territories.sort_by(|a, b| a.claimed_at.cmp(&b.claimed_at).then_with(|| a.id.cmp(&b.id)));
}
