//! Overlap resolution between a new claim and existing territories.
//!
//! Every existing territory owned by someone else is compared against the
//! original new polygon on its own; there is no running subtraction, so the
//! order of the snapshot never changes what an individual territory loses.
//!
//! Per territory:
//! - overlap under the noise floor: untouched, no record
//! - nothing left after `existing - new`: deleted, the full original area
//!   counts as conquered
//! - otherwise: the largest remaining fragment survives, is re-measured and
//!   gets an invasion entry in its history. Ownership does not change.
//!
//! Difference fragments under [`SLIVER_AREA`] are floating-point residue of
//! the boolean ops along shared edges and count as nothing left. Any real
//! remainder, however small, keeps the territory alive.

use geo::{BooleanOps, Polygon};
use log::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TerritoryError};
use crate::geo_utils::guard_geometry;
use crate::polygon_builder::{largest_by_area, measure_polygon, polygon_area};
use crate::{ClaimEvent, ConquerResult, Territory, TerritoryConfig, TerritoryInvasion};

/// Difference fragments below this area (m²) are numerical residue.
pub const SLIVER_AREA: f64 = 1e-3;

/// What a new claim did to one existing territory.
#[derive(Debug, Clone)]
enum Conquest {
    Destroyed {
        territory_id: String,
        owner_id: String,
        original_area: f64,
    },
    Shrunk { territory: Territory, overlap: f64 },
}

/// Resolve overlaps with default thresholds and the system clock.
pub fn resolve_overlaps<'a>(
    new_territory: &'a Territory,
    existing_territories: &[Territory],
    invader_username: Option<&str>,
) -> ConquerResult<'a> {
    resolve_overlaps_with(
        new_territory,
        existing_territories,
        invader_username,
        &TerritoryConfig::default(),
        &SystemClock,
    )
}

/// Resolve overlaps with custom thresholds and clock.
///
/// Never fails: a degenerate new territory yields an empty result, and a
/// geometry failure on one existing territory only skips that territory.
pub fn resolve_overlaps_with<'a>(
    new_territory: &'a Territory,
    existing_territories: &[Territory],
    invader_username: Option<&str>,
    config: &TerritoryConfig,
    clock: &dyn Clock,
) -> ConquerResult<'a> {
    let Some(new_polygon) = claim_polygon(new_territory) else {
        return ConquerResult::empty(new_territory);
    };
    let now = clock.now_millis();

    let conquests: Vec<Option<Conquest>> = existing_territories
        .iter()
        .filter(|existing| existing.owner_id != new_territory.owner_id)
        .map(|existing| evaluate(&new_polygon, new_territory, existing, config, now))
        .collect();

    assemble(new_territory, conquests, invader_username, now)
}

/// Parallel variant of [`resolve_overlaps_with`].
///
/// Territories are evaluated concurrently; the result keeps snapshot order.
#[cfg(feature = "parallel")]
pub fn resolve_overlaps_parallel<'a>(
    new_territory: &'a Territory,
    existing_territories: &[Territory],
    invader_username: Option<&str>,
    config: &TerritoryConfig,
    clock: &dyn Clock,
) -> ConquerResult<'a> {
    use rayon::prelude::*;

    let Some(new_polygon) = claim_polygon(new_territory) else {
        return ConquerResult::empty(new_territory);
    };
    let now = clock.now_millis();

    let conquests: Vec<Option<Conquest>> = existing_territories
        .par_iter()
        .filter(|existing| existing.owner_id != new_territory.owner_id)
        .map(|existing| evaluate(&new_polygon, new_territory, existing, config, now))
        .collect();

    assemble(new_territory, conquests, invader_username, now)
}

fn claim_polygon(new_territory: &Territory) -> Option<Polygon> {
    if new_territory.polygon.len() < 3 {
        debug!(
            "[Conquer] Territory {} has {} coordinates, nothing to resolve",
            new_territory.id,
            new_territory.polygon.len()
        );
        return None;
    }
    new_territory.to_polygon()
}

/// Compare against one existing territory, logging and skipping failures.
fn evaluate(
    new_polygon: &Polygon,
    new_territory: &Territory,
    existing: &Territory,
    config: &TerritoryConfig,
    now: i64,
) -> Option<Conquest> {
    match conquer_one(new_polygon, new_territory, existing, config, now) {
        Ok(conquest) => conquest,
        Err(e @ TerritoryError::DegenerateRing { .. }) => {
            debug!("[Conquer] Skipping {}", e);
            None
        }
        Err(e) => {
            warn!(
                "[Conquer] Skipping territory {} while resolving {}: {}",
                existing.id, new_territory.id, e
            );
            None
        }
    }
}

fn conquer_one(
    new_polygon: &Polygon,
    new_territory: &Territory,
    existing: &Territory,
    config: &TerritoryConfig,
    now: i64,
) -> Result<Option<Conquest>> {
    let existing_polygon = existing
        .to_polygon()
        .ok_or_else(|| TerritoryError::DegenerateRing {
            territory_id: existing.id.clone(),
            vertex_count: existing.polygon.len(),
        })?;
    if has_non_finite_coords(existing) {
        return Err(TerritoryError::geometry(
            "intersection",
            format!("territory {} has non-finite coordinates", existing.id),
        ));
    }

    let intersection = guard_geometry("intersection", || new_polygon.intersection(&existing_polygon))?;
    if intersection.0.is_empty() {
        return Ok(None);
    }
    let overlap = intersection
        .0
        .iter()
        .map(polygon_area)
        .sum::<Result<f64>>()?;
    if overlap < config.min_overlap_area {
        return Ok(None);
    }

    let difference = guard_geometry("difference", || existing_polygon.difference(new_polygon))?;

    let mut fragments = Vec::with_capacity(difference.0.len());
    for fragment in difference.0 {
        if polygon_area(&fragment)? >= SLIVER_AREA {
            fragments.push(fragment);
        }
    }

    let Some((remnant, _)) = largest_by_area(fragments, polygon_area)? else {
        debug!(
            "[Conquer] Territory {} of {} fully consumed by {}",
            existing.id, existing.owner_id, new_territory.id
        );
        return Ok(Some(Conquest::Destroyed {
            territory_id: existing.id.clone(),
            owner_id: existing.owner_id.clone(),
            original_area: existing.area,
        }));
    };

    let metrics = measure_polygon(&remnant)?;
    let mut territory = existing.clone();
    territory.area = metrics.area;
    territory.perimeter = metrics.perimeter;
    territory.center = metrics.center;
    territory.polygon = metrics.exterior;
    territory.holes = metrics.holes;
    territory.history.push(ClaimEvent {
        claimed_by: new_territory.owner_id.clone(),
        claimed_at: now,
        activity_id: new_territory.activity_id.clone(),
        previous_owner_id: Some(existing.owner_id.clone()),
    });

    debug!(
        "[Conquer] Territory {} of {} shrunk by {:.1} m² to {:.1} m²",
        existing.id, existing.owner_id, overlap, territory.area
    );

    Ok(Some(Conquest::Shrunk { territory, overlap }))
}

fn has_non_finite_coords(territory: &Territory) -> bool {
    territory
        .polygon
        .iter()
        .chain(territory.holes.iter().flatten())
        .flatten()
        .any(|v| !v.is_finite())
}

fn assemble<'a>(
    new_territory: &'a Territory,
    conquests: Vec<Option<Conquest>>,
    invader_username: Option<&str>,
    now: i64,
) -> ConquerResult<'a> {
    let mut result = ConquerResult::empty(new_territory);

    let invasion = |invaded_user_id: String,
                    invaded_territory_id: String,
                    overlap_area: f64,
                    destroyed: bool| {
        TerritoryInvasion {
            id: Uuid::new_v4().to_string(),
            invaded_user_id,
            invader_user_id: new_territory.owner_id.clone(),
            invader_username: invader_username.map(str::to_string),
            invaded_territory_id,
            new_territory_id: new_territory.id.clone(),
            overlap_area,
            territory_was_destroyed: destroyed,
            created_at: now,
            seen: false,
        }
    };

    for conquest in conquests.into_iter().flatten() {
        match conquest {
            Conquest::Destroyed {
                territory_id,
                owner_id,
                original_area,
            } => {
                result
                    .invasions
                    .push(invasion(owner_id, territory_id.clone(), original_area, true));
                result.deleted_territory_ids.push(territory_id);
            }
            Conquest::Shrunk { territory, overlap } => {
                result.invasions.push(invasion(
                    territory.owner_id.clone(),
                    territory.id.clone(),
                    overlap,
                    false,
                ));
                result.modified_territories.push(territory);
            }
        }
    }

    result.total_conquered_area = result.invasions.iter().map(|i| i.overlap_area).sum();
    result
}
