//! Spatial index over territory footprints.
//!
//! The R-tree holds one bounding box per stored territory and is updated on
//! every write, so a claim only has to be intersected with territories whose
//! boxes touch its own.

use std::collections::HashMap;

use rstar::{RTree, RTreeObject, AABB};

use crate::{Bounds, ConquerResult, Territory};

/// A territory's exterior bounds as stored in the tree.
#[derive(Debug, Clone, PartialEq)]
struct Footprint {
    territory_id: String,
    bounds: Bounds,
}

impl RTreeObject for Footprint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(&self.bounds)
    }
}

fn envelope(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bounds.min_lng, bounds.min_lat],
        [bounds.max_lng, bounds.max_lat],
    )
}

/// Bounding-box index over stored territories, keyed by territory id.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    tree: RTree<Footprint>,
    footprints: HashMap<String, Bounds>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a territory under its current bounds, replacing any earlier
    /// entry. A territory without coordinates is only unindexed.
    pub fn insert(&mut self, territory: &Territory) {
        self.remove(&territory.id);
        if let Some(bounds) = territory.bounds() {
            self.footprints.insert(territory.id.clone(), bounds);
            self.tree.insert(Footprint {
                territory_id: territory.id.clone(),
                bounds,
            });
        }
    }

    /// Drop a territory. Returns whether it was indexed.
    pub fn remove(&mut self, territory_id: &str) -> bool {
        let Some(bounds) = self.footprints.remove(territory_id) else {
            return false;
        };
        let footprint = Footprint {
            territory_id: territory_id.to_string(),
            bounds,
        };
        self.tree.remove(&footprint).is_some()
    }

    /// Mirror a conquer result: index the new territory and the shrunk
    /// remnants, drop the consumed ones.
    pub fn apply(&mut self, result: &ConquerResult<'_>) {
        self.insert(result.new_territory);
        for modified in &result.modified_territories {
            self.insert(modified);
        }
        for id in &result.deleted_territory_ids {
            self.remove(id);
        }
    }

    /// Replace the whole index with a bulk-loaded tree.
    pub fn rebuild<'a>(&mut self, territories: impl IntoIterator<Item = &'a Territory>) {
        self.footprints = territories
            .into_iter()
            .filter_map(|t| t.bounds().map(|b| (t.id.clone(), b)))
            .collect();
        let footprints = self
            .footprints
            .iter()
            .map(|(id, bounds)| Footprint {
                territory_id: id.clone(),
                bounds: *bounds,
            })
            .collect();
        self.tree = RTree::bulk_load(footprints);
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.footprints.clear();
    }

    /// Ids of territories whose boxes intersect `bounds`, sorted.
    pub fn query(&self, bounds: &Bounds) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tree
            .locate_in_envelope_intersecting(&envelope(bounds))
            .map(|f| f.territory_id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of other territories a claim could touch.
    pub fn candidates(&self, territory: &Territory) -> Vec<String> {
        let Some(bounds) = territory.bounds() else {
            return Vec::new();
        };
        let mut ids = self.query(&bounds);
        ids.retain(|id| *id != territory.id);
        ids
    }

    /// Bounds a territory is currently indexed under.
    pub fn bounds_of(&self, territory_id: &str) -> Option<Bounds> {
        self.footprints.get(territory_id).copied()
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}
