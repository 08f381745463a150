//! Loop closure detection.
//!
//! A recorded path is claimable when it has enough points and its start and
//! end lie within the closure threshold of each other.

use serde::{Deserialize, Serialize};

use crate::geo_utils::{guard_geometry, haversine_distance};
use crate::{GpsPoint, TerritoryConfig};

/// Result of a loop closure check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopClosure {
    pub is_closed: bool,
    /// Start-to-end distance in meters (`+inf` when not measurable)
    pub distance: f64,
}

impl LoopClosure {
    fn open() -> Self {
        Self {
            is_closed: false,
            distance: f64::INFINITY,
        }
    }
}

/// Check loop closure with the default thresholds (10 points, 200 m).
///
/// # Example
/// ```
/// use turfclaim::{check_loop_closure, GpsPoint};
///
/// let short = vec![GpsPoint::new(37.77, -122.42); 5];
/// let closure = check_loop_closure(&short);
/// assert!(!closure.is_closed);
/// assert!(closure.distance.is_infinite());
/// ```
pub fn check_loop_closure(path: &[GpsPoint]) -> LoopClosure {
    check_loop_closure_with(path, &TerritoryConfig::default())
}

/// Check loop closure with custom thresholds. Never panics.
pub fn check_loop_closure_with(path: &[GpsPoint], config: &TerritoryConfig) -> LoopClosure {
    if path.len() < config.min_path_points {
        return LoopClosure::open();
    }

    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return LoopClosure::open();
    };
    if !first.has_numeric_coords() || !last.has_numeric_coords() {
        return LoopClosure::open();
    }

    match guard_geometry("haversine_distance", || haversine_distance(first, last)) {
        Ok(distance) if distance.is_finite() => LoopClosure {
            is_closed: distance <= config.loop_closure_threshold,
            distance,
        },
        _ => LoopClosure::open(),
    }
}
