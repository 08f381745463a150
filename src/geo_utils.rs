//! Geographic utilities: distances, ring conversion and the guard around
//! geometry-library calls.

use std::panic::{self, AssertUnwindSafe};

use geo::{Coord, HaversineDistance, LineString, Point};

use crate::error::{Result, TerritoryError};
use crate::GpsPoint;

/// Meters per degree of latitude (approximately constant).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Great-circle distance between two GPS points in meters.
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let a = Point::new(p1.longitude, p1.latitude);
    let b = Point::new(p2.longitude, p2.latitude);
    a.haversine_distance(&b)
}

/// Convert a distance in meters to degrees of longitude at `latitude`.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg
}

// ============================================================================
// Rings
// ============================================================================

/// Append the first coordinate if the ring is not already closed.
pub fn close_ring(mut ring: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// `[lng, lat]` ring to a closed geo line string.
pub fn ring_to_linestring(ring: &[[f64; 2]]) -> LineString {
    let mut line: LineString = ring
        .iter()
        .map(|[lng, lat]| Coord { x: *lng, y: *lat })
        .collect();
    line.close();
    line
}

/// geo line string back to a `[lng, lat]` ring (kept closed).
pub fn linestring_to_ring(line: &LineString) -> Vec<[f64; 2]> {
    close_ring(line.coords().map(|c| [c.x, c.y]).collect())
}

// ============================================================================
// Geometry guard
// ============================================================================

/// Run a geometry-library call, turning a panic into `GeometryFailure`.
///
/// The boolean-ops backend asserts on some degenerate inputs instead of
/// returning an error; those must not escape a claim.
pub(crate) fn guard_geometry<T>(operation: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "geometry backend panicked".to_string());
        TerritoryError::geometry(operation, detail)
    })
}

/// Reject NaN or infinite measurements coming back from the backend.
pub(crate) fn finite_measure(operation: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TerritoryError::geometry(operation, format!("non-finite result {value}")))
    }
}
