//! # Turf Claim
//!
//! Territory geometry and conquering engine for GPS loop claims.
//!
//! This library provides:
//! - Loop closure detection for recorded GPS paths
//! - Conversion of a closed path into a clean simple polygon (territory)
//! - Overlap resolution between a new claim and existing territories,
//!   with exact area accounting and invasion records
//! - Per-point speed plausibility classification
//! - An in-memory reference engine that applies claims to a territory set
//!
//! ## Features
//!
//! - **`parallel`** - Resolve overlaps against large snapshots with rayon
//! - **`synthetic`** - Seeded loop generators for tests and benchmarks
//! - **`cli`** - Debug CLI for replaying GPX activities
//!
//! ## Quick Start
//!
//! ```rust
//! use turfclaim::{check_loop_closure, process_territory, resolve_overlaps, GpsPoint};
//!
//! // A small square loop, walked counter-clockwise
//! let side = 0.001;
//! let mut path = Vec::new();
//! for i in 0..5 {
//!     let t = i as f64 / 5.0;
//!     path.push(GpsPoint::new(37.77, -122.42 + side * t));
//! }
//! for i in 0..5 {
//!     let t = i as f64 / 5.0;
//!     path.push(GpsPoint::new(37.77 + side * t, -122.42 + side));
//! }
//! for i in 0..5 {
//!     let t = i as f64 / 5.0;
//!     path.push(GpsPoint::new(37.77 + side, -122.42 + side * (1.0 - t)));
//! }
//! for i in 0..5 {
//!     let t = i as f64 / 5.0;
//!     path.push(GpsPoint::new(37.77 + side * (1.0 - t), -122.42));
//! }
//!
//! assert!(check_loop_closure(&path).is_closed);
//!
//! let territory = process_territory(&path, "alice", "run-1").unwrap();
//! let result = resolve_overlaps(&territory, &[], None);
//! assert_eq!(result.total_conquered_area, 0.0);
//! ```

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TerritoryError};

// Injectable wall clock
pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

// Geographic utilities (distance, rings)
pub mod geo_utils;

// Self-intersection splitting
pub mod unkink;

// Loop closure detection
pub mod loop_detector;
pub use loop_detector::{check_loop_closure, check_loop_closure_with, LoopClosure};

// Closed path -> territory polygon
pub mod polygon_builder;
pub use polygon_builder::{build_territory, process_territory, process_territory_with};

// New claim vs existing territories
pub mod overlap;
#[cfg(feature = "parallel")]
pub use overlap::resolve_overlaps_parallel;
pub use overlap::{resolve_overlaps, resolve_overlaps_with};

// Speed plausibility classification
pub mod speed;
pub use speed::{
    validate_path_speeds, validate_speed, ActivityType, SpeedEnvelope, SpeedReport, SpeedVerdict,
    SpeedViolation,
};

// In-memory reference engine
pub mod engine;
pub use engine::{
    ClaimReceipt, EngineStats, InvasionLog, SpatialIndex, TerritoryEngine, TerritoryStore,
};

// Synthetic loop generators
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS sample as produced by the location collaborator.
///
/// # Example
/// ```
/// use turfclaim::GpsPoint;
/// let point = GpsPoint::new(37.77, -122.42); // San Francisco
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds
    #[serde(default)]
    pub timestamp: i64,
    /// Ground speed in m/s, when the sensor reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Horizontal accuracy in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Altitude in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl GpsPoint {
    /// Create a GPS point with only a position.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: 0,
            speed: None,
            accuracy: None,
            elevation: None,
        }
    }

    /// Create a GPS point with a timestamp and reported speed.
    pub fn with_speed(latitude: f64, longitude: f64, timestamp: i64, speed: f64) -> Self {
        Self {
            timestamp,
            speed: Some(speed),
            ..Self::new(latitude, longitude)
        }
    }

    /// True when both coordinates are numbers (not NaN or infinite).
    ///
    /// This is the filter applied before building a territory.
    pub fn has_numeric_coords(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Check if the point has numeric coordinates inside WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.has_numeric_coords()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Position as a `[lng, lat]` coordinate.
    pub fn to_coord(&self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// A plain latitude/longitude pair (territory centers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        Self::from_lng_lat(points.iter().map(|p| [p.longitude, p.latitude]))
    }

    /// Create bounds from `[lng, lat]` coordinates.
    pub fn from_lng_lat(coords: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for [lng, lat] in coords {
            let b = bounds.get_or_insert(Self {
                min_lat: lat,
                max_lat: lat,
                min_lng: lng,
                max_lng: lng,
            });
            b.min_lat = b.min_lat.min(lat);
            b.max_lat = b.max_lat.max(lat);
            b.min_lng = b.min_lng.min(lng);
            b.max_lng = b.max_lng.max(lng);
        }
        bounds
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Thresholds used by loop detection, polygon building and overlap resolution.
#[derive(Debug, Clone)]
pub struct TerritoryConfig {
    /// Minimum number of path points for a claim.
    /// Default: 10
    pub min_path_points: usize,

    /// Maximum start/end distance for a path to count as a closed loop.
    /// Default: 200.0 meters
    pub loop_closure_threshold: f64,

    /// Claims enclosing less area than this are rejected as GPS noise.
    /// Default: 10.0 m²
    pub min_territory_area: f64,

    /// Overlaps smaller than this never produce an invasion.
    /// Default: 1.0 m²
    pub min_overlap_area: f64,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            min_path_points: 10,
            loop_closure_threshold: 200.0,
            min_territory_area: 10.0,
            min_overlap_area: 1.0,
        }
    }
}

// ============================================================================
// Territory Types
// ============================================================================

/// One entry of a territory's claim log.
///
/// `previous_owner_id` is only set on entries appended by an invasion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEvent {
    pub claimed_by: String,
    /// Epoch milliseconds
    pub claimed_at: i64,
    pub activity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_owner_id: Option<String>,
}

/// A claimed polygonal area of ground, owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    pub id: String,
    /// User-assigned name (set after the claim)
    #[serde(default)]
    pub name: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    pub activity_id: String,
    /// Epoch milliseconds
    pub claimed_at: i64,
    /// Square meters
    pub area: f64,
    /// Meters
    pub perimeter: f64,
    pub center: LatLng,
    /// Closed exterior ring of `[lng, lat]` pairs
    pub polygon: Vec<[f64; 2]>,
    /// Closed interior rings left behind when a claim lands strictly inside
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<[f64; 2]>>,
    pub history: Vec<ClaimEvent>,
}

impl Territory {
    /// Build a geo polygon from the stored rings, closing them if needed.
    ///
    /// Returns `None` if the exterior ring has fewer than 3 coordinates.
    pub fn to_polygon(&self) -> Option<Polygon> {
        if self.polygon.len() < 3 {
            return None;
        }
        let exterior = geo_utils::ring_to_linestring(&self.polygon);
        let interiors: Vec<LineString> = self
            .holes
            .iter()
            .filter(|h| h.len() >= 3)
            .map(|h| geo_utils::ring_to_linestring(h))
            .collect();
        Some(Polygon::new(exterior, interiors))
    }

    /// Bounding box of the exterior ring.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_lng_lat(self.polygon.iter().copied())
    }

    /// Exterior ring reordered to `[lat, lng]` for map renderers.
    pub fn polygon_lat_lng(&self) -> Vec<[f64; 2]> {
        self.polygon.iter().map(|[lng, lat]| [*lat, *lng]).collect()
    }
}

/// Notification record for one instance of conquering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryInvasion {
    pub id: String,
    pub invaded_user_id: String,
    pub invader_user_id: String,
    #[serde(default)]
    pub invader_username: Option<String>,
    pub invaded_territory_id: String,
    pub new_territory_id: String,
    /// Square meters taken (the full original area when destroyed)
    pub overlap_area: f64,
    pub territory_was_destroyed: bool,
    /// Epoch milliseconds
    pub created_at: i64,
    pub seen: bool,
}

impl TerritoryInvasion {
    /// Acknowledge the invasion on behalf of the invaded user.
    pub fn mark_seen(&mut self) {
        self.seen = true;
    }
}

/// Outcome of resolving one new claim against existing territories.
///
/// The new territory is borrowed, never modified.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConquerResult<'a> {
    pub new_territory: &'a Territory,
    pub modified_territories: Vec<Territory>,
    pub deleted_territory_ids: Vec<String>,
    pub invasions: Vec<TerritoryInvasion>,
    /// Sum of `overlap_area` across `invasions`
    pub total_conquered_area: f64,
}

impl<'a> ConquerResult<'a> {
    /// A result with no effect on any existing territory.
    pub fn empty(new_territory: &'a Territory) -> Self {
        Self {
            new_territory,
            modified_territories: Vec::new(),
            deleted_territory_ids: Vec::new(),
            invasions: Vec::new(),
            total_conquered_area: 0.0,
        }
    }

    /// True when the claim touched no other user's territory.
    pub fn is_empty(&self) -> bool {
        self.invasions.is_empty()
    }

    /// Distinct invaded user ids, in invasion order.
    pub fn invaded_users(&self) -> Vec<&str> {
        let mut users: Vec<&str> = Vec::new();
        for invasion in &self.invasions {
            if !users.contains(&invasion.invaded_user_id.as_str()) {
                users.push(&invasion.invaded_user_id);
            }
        }
        users
    }
}
