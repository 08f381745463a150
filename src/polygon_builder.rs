//! Closed GPS path to territory polygon.
//!
//! The path is cleaned of non-numeric samples, closed into a ring, split at
//! self-crossings (largest fragment wins, ties go to the first fragment),
//! oriented counter-clockwise and measured geodesically.

use geo::orient::{Direction, Orient};
use geo::{Centroid, Coord, GeodesicArea, GeodesicLength, LineString, Polygon};
use log::{debug, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{OptionExt, Result, TerritoryError};
use crate::geo_utils::{finite_measure, guard_geometry, linestring_to_ring};
use crate::unkink::unkink_ring;
use crate::{ClaimEvent, GpsPoint, LatLng, Territory, TerritoryConfig};

/// Area, perimeter, centroid and rings of a normalized polygon.
#[derive(Debug, Clone)]
pub(crate) struct PolygonMetrics {
    pub area: f64,
    pub perimeter: f64,
    pub center: LatLng,
    pub exterior: Vec<[f64; 2]>,
    pub holes: Vec<Vec<[f64; 2]>>,
}

/// Geodesic area of a polygon in m² (holes excluded), whatever its winding.
///
/// A clockwise exterior is measured by the geodesic backend as the rest of
/// the globe, so the rings are oriented before measuring.
pub(crate) fn polygon_area(polygon: &Polygon) -> Result<f64> {
    let area = guard_geometry("geodesic_area", || {
        polygon.orient(Direction::Default).geodesic_area_unsigned()
    })?;
    finite_measure("geodesic_area", area)
}

/// Orient the polygon counter-clockwise and measure it.
pub(crate) fn measure_polygon(polygon: &Polygon) -> Result<PolygonMetrics> {
    let oriented = guard_geometry("orient", || polygon.orient(Direction::Default))?;

    let area = polygon_area(&oriented)?;

    // Area-weighted centroid, not the vertex mean
    let centroid = guard_geometry("centroid", || oriented.centroid())?
        .ok_or_geometry("centroid", "polygon has no centroid")?;
    let center = LatLng::new(
        finite_measure("centroid", centroid.y())?,
        finite_measure("centroid", centroid.x())?,
    );

    let perimeter = guard_geometry("geodesic_length", || oriented.exterior().geodesic_length())?;
    let perimeter = finite_measure("geodesic_length", perimeter)?;

    Ok(PolygonMetrics {
        area,
        perimeter,
        center,
        exterior: linestring_to_ring(oriented.exterior()),
        holes: oriented.interiors().iter().map(linestring_to_ring).collect(),
    })
}

/// Pick the candidate with the largest area. Ties keep the earlier one.
pub(crate) fn largest_by_area<T>(
    candidates: impl IntoIterator<Item = T>,
    area_of: impl Fn(&T) -> Result<f64>,
) -> Result<Option<(T, f64)>> {
    let mut best: Option<(T, f64)> = None;
    for candidate in candidates {
        let area = area_of(&candidate)?;
        let replace = match &best {
            Some((_, best_area)) => area > *best_area,
            None => true,
        };
        if replace {
            best = Some((candidate, area));
        }
    }
    Ok(best)
}

/// Build a territory from a closed path, reporting why a claim was rejected.
///
/// Steps: filter non-numeric points, close the ring, unkink and keep the
/// largest fragment, orient, then measure area (rejecting anything under
/// `min_territory_area`), centroid and perimeter.
pub fn build_territory(
    path: &[GpsPoint],
    owner_id: &str,
    activity_id: &str,
    config: &TerritoryConfig,
    clock: &dyn Clock,
) -> Result<Territory> {
    let mut coords: Vec<Coord> = path
        .iter()
        .filter(|p| p.has_numeric_coords())
        .map(GpsPoint::to_coord)
        .collect();

    let first = coords
        .first()
        .copied()
        .filter(|_| coords.len() >= config.min_path_points)
        .ok_or_insufficient_points(activity_id, coords.len(), config.min_path_points)?;

    if coords.last() != Some(&first) {
        coords.push(first);
    }

    let fragments = guard_geometry("unkink", || unkink_ring(&coords))?;
    if fragments.len() > 1 {
        debug!(
            "[Territory] Path for activity {} self-intersects: {} fragments",
            activity_id,
            fragments.len()
        );
    }

    let polygons = fragments
        .into_iter()
        .map(|fragment| Polygon::new(LineString::from(fragment), vec![]));
    let (polygon, _) = largest_by_area(polygons, polygon_area)?.ok_or(
        TerritoryError::AreaTooSmall {
            area: 0.0,
            minimum: config.min_territory_area,
        },
    )?;

    let metrics = measure_polygon(&polygon)?;
    if metrics.area < config.min_territory_area {
        return Err(TerritoryError::AreaTooSmall {
            area: metrics.area,
            minimum: config.min_territory_area,
        });
    }

    let now = clock.now_millis();
    Ok(Territory {
        id: Uuid::new_v4().to_string(),
        name: None,
        owner_id: owner_id.to_string(),
        owner_name: None,
        activity_id: activity_id.to_string(),
        claimed_at: now,
        area: metrics.area,
        perimeter: metrics.perimeter,
        center: metrics.center,
        polygon: metrics.exterior,
        holes: metrics.holes,
        history: vec![ClaimEvent {
            claimed_by: owner_id.to_string(),
            claimed_at: now,
            activity_id: activity_id.to_string(),
            previous_owner_id: None,
        }],
    })
}

impl Territory {
    /// Rebuild a territory from a stored `[lng, lat]` ring, recomputing
    /// area, perimeter and center. Used when importing territories that
    /// were not produced by [`build_territory`].
    pub fn from_ring(
        id: &str,
        owner_id: &str,
        activity_id: &str,
        ring: &[[f64; 2]],
        claimed_at: i64,
    ) -> Result<Territory> {
        if ring.len() < 3 {
            return Err(TerritoryError::DegenerateRing {
                territory_id: id.to_string(),
                vertex_count: ring.len(),
            });
        }
        let polygon = Polygon::new(crate::geo_utils::ring_to_linestring(ring), vec![]);
        let metrics = measure_polygon(&polygon)?;

        Ok(Territory {
            id: id.to_string(),
            name: None,
            owner_id: owner_id.to_string(),
            owner_name: None,
            activity_id: activity_id.to_string(),
            claimed_at,
            area: metrics.area,
            perimeter: metrics.perimeter,
            center: metrics.center,
            polygon: metrics.exterior,
            holes: metrics.holes,
            history: vec![ClaimEvent {
                claimed_by: owner_id.to_string(),
                claimed_at,
                activity_id: activity_id.to_string(),
                previous_owner_id: None,
            }],
        })
    }
}

/// Convert a closed path into a territory with default thresholds.
///
/// Returns `None` when the activity didn't enclose a valid area.
pub fn process_territory(path: &[GpsPoint], owner_id: &str, activity_id: &str) -> Option<Territory> {
    process_territory_with(
        path,
        owner_id,
        activity_id,
        &TerritoryConfig::default(),
        &SystemClock,
    )
}

/// Convert a closed path into a territory with custom thresholds and clock.
pub fn process_territory_with(
    path: &[GpsPoint],
    owner_id: &str,
    activity_id: &str,
    config: &TerritoryConfig,
    clock: &dyn Clock,
) -> Option<Territory> {
    match build_territory(path, owner_id, activity_id, config, clock) {
        Ok(territory) => {
            debug!(
                "[Territory] Activity {} claimed {:.0} m² (perimeter {:.0} m)",
                activity_id, territory.area, territory.perimeter
            );
            Some(territory)
        }
        Err(e @ TerritoryError::GeometryFailure { .. }) => {
            warn!("[Territory] Rejected claim for activity {}: {}", activity_id, e);
            None
        }
        Err(e) => {
            debug!("[Territory] No territory for activity {}: {}", activity_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_by_area_keeps_first_on_tie() {
        let picked = largest_by_area(vec![("a", 5.0), ("b", 7.0), ("c", 7.0)], |(_, a)| Ok(*a))
            .unwrap()
            .unwrap();
        assert_eq!(picked.0 .0, "b");
        assert_eq!(picked.1, 7.0);
    }

    fn square(min_x: f64, min_y: f64, side: f64, clockwise: bool) -> Polygon {
        let mut ring = vec![
            (min_x, min_y),
            (min_x + side, min_y),
            (min_x + side, min_y + side),
            (min_x, min_y + side),
        ];
        if clockwise {
            ring.reverse();
        }
        Polygon::new(LineString::from(ring), vec![])
    }

    #[test]
    fn test_clockwise_fragment_measures_its_own_area() {
        let ccw = polygon_area(&square(0.5, 0.5, 0.25, false)).unwrap();
        let cw = polygon_area(&square(0.5, 0.5, 0.25, true)).unwrap();
        assert!((ccw - cw).abs() < ccw * 1e-9);
        // ~27.8 km x 27.8 km
        assert!(cw > 7.0e8 && cw < 8.0e8);
    }

    /// Counter-clockwise square starting at its north-west corner, the
    /// vertex order `orient` gives a clockwise `square`.
    fn reoriented_square(min_x: f64, min_y: f64, side: f64) -> Polygon {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y + side),
                (min_x, min_y),
                (min_x + side, min_y),
                (min_x + side, min_y + side),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_tie_keeps_first_fragment_whatever_its_winding() {
        // Same shape shifted by a whole longitude step: equal geodesic area
        let first = square(0.5, 0.5, 0.25, true);
        let second = reoriented_square(1.5, 0.5, 0.25);

        let (picked, _) = largest_by_area(vec![first, second], polygon_area)
            .unwrap()
            .unwrap();
        let centroid = picked.centroid().unwrap();
        assert!((centroid.x() - 0.625).abs() < 1e-9);

        let first = reoriented_square(1.5, 0.5, 0.25);
        let second = square(0.5, 0.5, 0.25, true);
        let (picked, _) = largest_by_area(vec![first, second], polygon_area)
            .unwrap()
            .unwrap();
        let centroid = picked.centroid().unwrap();
        assert!((centroid.x() - 1.625).abs() < 1e-9);
    }

    #[test]
    fn test_largest_by_area_empty() {
        let picked = largest_by_area(Vec::<f64>::new(), |a| Ok(*a)).unwrap();
        assert!(picked.is_none());
    }

    #[test]
    fn test_measure_orients_counter_clockwise() {
        // Clockwise square
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 0.001), (0.001, 0.001), (0.001, 0.0)]),
            vec![],
        );
        let metrics = measure_polygon(&polygon).unwrap();
        let ring = LineString::from(
            metrics
                .exterior
                .iter()
                .map(|[x, y]| (*x, *y))
                .collect::<Vec<_>>(),
        );
        use geo::Winding;
        assert!(ring.is_ccw());
        assert!((metrics.center.latitude - 0.0005).abs() < 1e-9);
        assert!((metrics.center.longitude - 0.0005).abs() < 1e-9);
    }
}
