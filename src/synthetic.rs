//! Synthetic GPS loops for tests, benchmarks and the CLI demo.
//!
//! Generates closed activity paths of known shape around a center, with
//! optional Gaussian GPS noise, so claim geometry can be checked against a
//! ground truth.
//!
//! Feature-gated behind `synthetic`.
//!
//! # Example
//!
//! ```rust
//! use turfclaim::synthetic::{LoopConfig, LoopShape};
//! use turfclaim::{check_loop_closure, LatLng};
//!
//! let path = LoopConfig {
//!     center: LatLng::new(37.77, -122.42),
//!     radius_meters: 100.0,
//!     point_count: 40,
//!     shape: LoopShape::Circle,
//!     gps_noise_sigma_meters: 0.0,
//!     speed_mps: Some(3.0),
//!     seed: 7,
//! }
//! .generate();
//!
//! assert_eq!(path.len(), 40);
//! assert!(check_loop_closure(&path).is_closed);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::{meters_to_degrees, METERS_PER_DEG_LAT};
use crate::{GpsPoint, LatLng, Result, Territory};

/// Shape of a generated loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopShape {
    /// Axis-aligned square, walked counter-clockwise from the south-west corner.
    Square,
    /// Circle, walked counter-clockwise from due east.
    Circle,
    /// Lemniscate crossing itself at the center.
    FigureEight,
}

/// Configuration for one synthetic loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub center: LatLng,
    /// Half the side for squares, the radius for circles, the half-width
    /// for figure-eights.
    pub radius_meters: f64,
    /// Number of samples; the loop ends one step short of its start.
    pub point_count: usize,
    pub shape: LoopShape,
    /// GPS noise standard deviation in meters.
    pub gps_noise_sigma_meters: f64,
    /// Reported speed for every sample, if any.
    pub speed_mps: Option<f64>,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl LoopConfig {
    /// Generate the loop's GPS samples (one per second).
    pub fn generate(&self) -> Vec<GpsPoint> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.point_count.max(1);

        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let (east, north) = self.offset_at(t);
                let (noise_east, noise_north) = gaussian_pair(&mut rng, self.gps_noise_sigma_meters);

                let latitude =
                    self.center.latitude + (north + noise_north) / METERS_PER_DEG_LAT;
                let longitude = self.center.longitude
                    + meters_to_degrees(east + noise_east, self.center.latitude);

                GpsPoint {
                    latitude,
                    longitude,
                    timestamp: i as i64 * 1000,
                    speed: self.speed_mps,
                    accuracy: Some(self.gps_noise_sigma_meters.max(3.0)),
                    elevation: None,
                }
            })
            .collect()
    }

    /// Offset in meters (east, north) at parameter `t` in `[0, 1)`.
    fn offset_at(&self, t: f64) -> (f64, f64) {
        let r = self.radius_meters;
        match self.shape {
            LoopShape::Square => {
                let s = t * 4.0;
                let f = s.fract() * 2.0 - 1.0;
                match s as usize {
                    0 => (f * r, -r),
                    1 => (r, f * r),
                    2 => (-f * r, r),
                    _ => (-r, -f * r),
                }
            }
            LoopShape::Circle => {
                let a = 2.0 * PI * t;
                (r * a.cos(), r * a.sin())
            }
            LoopShape::FigureEight => {
                let a = 2.0 * PI * t;
                (r * a.sin(), r * a.sin() * a.cos())
            }
        }
    }
}

/// Box-Muller Gaussian noise pair.
fn gaussian_pair(rng: &mut StdRng, sigma: f64) -> (f64, f64) {
    if sigma <= 0.0 {
        return (0.0, 0.0);
    }
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let radius = (-2.0 * u1.ln()).sqrt() * sigma;
    (
        radius * (2.0 * PI * u2).cos(),
        radius * (2.0 * PI * u2).sin(),
    )
}

/// Closed `[lng, lat]` ring of an axis-aligned square in degrees.
pub fn square_ring(center_lat: f64, center_lng: f64, half_size_deg: f64) -> Vec<[f64; 2]> {
    vec![
        [center_lng - half_size_deg, center_lat - half_size_deg],
        [center_lng + half_size_deg, center_lat - half_size_deg],
        [center_lng + half_size_deg, center_lat + half_size_deg],
        [center_lng - half_size_deg, center_lat + half_size_deg],
        [center_lng - half_size_deg, center_lat - half_size_deg],
    ]
}

/// An already-claimed square territory.
pub fn square_territory(
    id: &str,
    owner_id: &str,
    center_lat: f64,
    center_lng: f64,
    half_size_deg: f64,
) -> Result<Territory> {
    Territory::from_ring(
        id,
        owner_id,
        &format!("activity-{id}"),
        &square_ring(center_lat, center_lng, half_size_deg),
        0,
    )
}

/// A grid of `rows x cols` square territories owned round-robin by `owners`.
///
/// Neighbouring squares share edges; useful as a dense snapshot for
/// benchmarks.
pub fn territory_grid(
    origin: LatLng,
    rows: usize,
    cols: usize,
    cell_deg: f64,
    owners: &[&str],
) -> Vec<Territory> {
    let half = cell_deg / 2.0;
    let mut territories = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let owner = owners.get(index % owners.len().max(1)).copied().unwrap_or("nobody");
            let lat = origin.latitude + (row as f64 + 0.5) * cell_deg;
            let lng = origin.longitude + (col as f64 + 0.5) * cell_deg;
            if let Ok(t) = square_territory(&format!("grid-{row}-{col}"), owner, lat, lng, half) {
                territories.push(t);
            }
        }
    }
    territories
}
