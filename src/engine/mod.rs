//! # Territory Engine
//!
//! An in-memory stand-in for the persistence collaborator: it keeps the
//! territory set, finds claim candidates through an R-tree and applies
//! conquer results.
//!
//! ## Architecture
//!
//! The engine is composed of focused modules:
//! - `TerritoryStore` - Territory CRUD and result application
//! - `SpatialIndex` - R-tree for candidate and viewport queries
//! - `InvasionLog` - Invasion notifications with `seen` tracking
//!
//! Claims go through `&mut self`, so two claims can never resolve against
//! the same stale snapshot inside one engine.

pub mod invasion_log;
pub mod spatial_index;
pub mod territory_store;

pub use invasion_log::InvasionLog;
pub use spatial_index::SpatialIndex;
pub use territory_store::TerritoryStore;

use log::{debug, info};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::loop_detector::check_loop_closure_with;
use crate::overlap::resolve_overlaps_with;
use crate::polygon_builder::process_territory_with;
use crate::{Bounds, ConquerResult, GpsPoint, Territory, TerritoryConfig, TerritoryInvasion};

/// What a successful claim did, detached from the engine's borrows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceipt {
    pub territory: Territory,
    pub modified_territory_ids: Vec<String>,
    pub deleted_territory_ids: Vec<String>,
    pub invasions: Vec<TerritoryInvasion>,
    pub total_conquered_area: f64,
}

impl From<&ConquerResult<'_>> for ClaimReceipt {
    fn from(result: &ConquerResult<'_>) -> Self {
        Self {
            territory: result.new_territory.clone(),
            modified_territory_ids: result
                .modified_territories
                .iter()
                .map(|t| t.id.clone())
                .collect(),
            deleted_territory_ids: result.deleted_territory_ids.clone(),
            invasions: result.invasions.clone(),
            total_conquered_area: result.total_conquered_area,
        }
    }
}

/// Territory engine using the store, index and log components.
pub struct TerritoryEngine {
    pub territories: TerritoryStore,
    pub spatial: SpatialIndex,
    pub invasions: InvasionLog,

    config: TerritoryConfig,
    clock: Box<dyn Clock>,
}

impl Default for TerritoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TerritoryEngine {
    /// Create a new engine with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(TerritoryConfig::default(), Box::new(SystemClock))
    }

    /// Create a new engine with custom configuration and clock.
    pub fn with_config(config: TerritoryConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            territories: TerritoryStore::new(),
            spatial: SpatialIndex::new(),
            invasions: InvasionLog::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &TerritoryConfig {
        &self.config
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Turn a recorded path into a territory and conquer whatever it covers.
    ///
    /// Returns `None` when the path is not a closed loop or encloses no
    /// valid area; the engine is unchanged in that case.
    pub fn claim_activity(
        &mut self,
        path: &[GpsPoint],
        owner_id: &str,
        owner_name: Option<&str>,
        activity_id: &str,
    ) -> Option<ClaimReceipt> {
        let closure = check_loop_closure_with(path, &self.config);
        if !closure.is_closed {
            debug!(
                "[Engine] Activity {} is not a closed loop (gap {:.0} m)",
                activity_id, closure.distance
            );
            return None;
        }

        let mut territory = process_territory_with(
            path,
            owner_id,
            activity_id,
            &self.config,
            self.clock.as_ref(),
        )?;
        territory.owner_name = owner_name.map(str::to_string);

        let candidates = self.candidates_for(&territory);
        let result = resolve_overlaps_with(
            &territory,
            &candidates,
            owner_name,
            &self.config,
            self.clock.as_ref(),
        );

        let receipt = ClaimReceipt::from(&result);
        self.apply(&result);

        info!(
            "[Engine] {} claimed {:.0} m² with activity {}: {} invasions, {:.0} m² conquered",
            owner_id,
            receipt.territory.area,
            activity_id,
            receipt.invasions.len(),
            receipt.total_conquered_area
        );

        Some(receipt)
    }

    /// Existing territories whose bounding boxes touch the claim.
    fn candidates_for(&self, territory: &Territory) -> Vec<Territory> {
        let ids = self.spatial.candidates(territory);
        self.territories.snapshot(&ids)
    }

    /// Write a conquer result into the store, index and log.
    pub fn apply(&mut self, result: &ConquerResult<'_>) {
        self.territories.apply(result);
        self.spatial.apply(result);
        self.invasions.append(result.invasions.iter().cloned());
    }

    // ========================================================================
    // Territory Management (delegates to TerritoryStore)
    // ========================================================================

    /// Load an existing territory (e.g. from persistence).
    pub fn add_territory(&mut self, territory: Territory) {
        self.spatial.insert(&territory);
        self.territories.upsert(territory);
    }

    /// Load many territories at once, bulk-loading the index.
    pub fn load_territories(&mut self, territories: impl IntoIterator<Item = Territory>) {
        for territory in territories {
            self.territories.upsert(territory);
        }
        self.spatial.rebuild(self.territories.values());
    }

    /// Remove a territory.
    pub fn remove_territory(&mut self, id: &str) -> Option<Territory> {
        self.spatial.remove(id);
        self.territories.remove(id)
    }

    /// Set the user-assigned name of a territory.
    pub fn rename_territory(&mut self, id: &str, name: &str) -> bool {
        match self.territories.get_mut(id) {
            Some(territory) => {
                territory.name = Some(name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get_territory(&self, id: &str) -> Option<&Territory> {
        self.territories.get(id)
    }

    pub fn has_territory(&self, id: &str) -> bool {
        self.territories.contains(id)
    }

    pub fn territory_count(&self) -> usize {
        self.territories.len()
    }

    /// Territories owned by a user, oldest claim first.
    pub fn territories_for_owner(&self, owner_id: &str) -> Vec<&Territory> {
        self.territories.for_owner(owner_id)
    }

    /// Total area currently held by a user in m².
    pub fn area_for_owner(&self, owner_id: &str) -> f64 {
        self.territories
            .for_owner(owner_id)
            .iter()
            .map(|t| t.area)
            .sum()
    }

    /// Clear all territories and invasions.
    pub fn clear(&mut self) {
        self.territories.clear();
        self.spatial.clear();
        self.invasions.clear();
    }

    // ========================================================================
    // Spatial Queries (delegates to SpatialIndex)
    // ========================================================================

    /// Ids of territories whose bounding boxes intersect a viewport.
    pub fn query_viewport(&self, bounds: &Bounds) -> Vec<String> {
        self.spatial.query(bounds)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get engine statistics.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            territory_count: self.territories.len() as u32,
            owner_count: self.territories.owner_count() as u32,
            invasion_count: self.invasions.len() as u32,
            unseen_invasion_count: self.invasions.iter().filter(|i| !i.seen).count() as u32,
        }
    }
}

/// Engine statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub territory_count: u32,
    pub owner_count: u32,
    pub invasion_count: u32,
    pub unseen_invasion_count: u32,
}
