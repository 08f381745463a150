//! Tests for loop closure detection

use turfclaim::{check_loop_closure, check_loop_closure_with, GpsPoint, TerritoryConfig};

/// Square loop walked counter-clockwise, `per_side` samples per side.
fn square_path(center_lat: f64, center_lng: f64, half: f64, per_side: usize) -> Vec<GpsPoint> {
    let corners = [
        (center_lat - half, center_lng - half),
        (center_lat - half, center_lng + half),
        (center_lat + half, center_lng + half),
        (center_lat + half, center_lng - half),
    ];
    let mut path = Vec::new();
    for side in 0..4 {
        let (lat0, lng0) = corners[side];
        let (lat1, lng1) = corners[(side + 1) % 4];
        for i in 0..per_side {
            let t = i as f64 / per_side as f64;
            path.push(GpsPoint::new(lat0 + (lat1 - lat0) * t, lng0 + (lng1 - lng0) * t));
        }
    }
    path
}

#[test]
fn test_closed_square() {
    let path = square_path(37.77, -122.42, 0.0005, 5);
    let closure = check_loop_closure(&path);
    assert!(closure.is_closed);
    assert!(closure.distance > 0.0);
    assert!(closure.distance < 50.0);
}

#[test]
fn test_too_few_points() {
    let path = square_path(37.77, -122.42, 0.0005, 2);
    assert_eq!(path.len(), 8);

    let closure = check_loop_closure(&path);
    assert!(!closure.is_closed);
    assert!(closure.distance.is_infinite());
}

#[test]
fn test_exactly_ten_points_is_enough() {
    let path: Vec<GpsPoint> = (0..10)
        .map(|i| GpsPoint::new(37.77 + i as f64 * 0.00001, -122.42))
        .collect();
    let closure = check_loop_closure(&path);
    assert!(closure.is_closed);
}

#[test]
fn test_straight_line_not_closed() {
    // ~1.1 km due north
    let path: Vec<GpsPoint> = (0..20)
        .map(|i| GpsPoint::new(37.77 + i as f64 * 0.0005, -122.42))
        .collect();
    let closure = check_loop_closure(&path);
    assert!(!closure.is_closed);
    assert!(closure.distance > 1000.0);
    assert!(closure.distance.is_finite());
}

#[test]
fn test_threshold_is_inclusive_boundary() {
    // 0.0017 degrees of latitude is ~189 m, 0.0019 is ~211 m
    let mut inside: Vec<GpsPoint> = vec![GpsPoint::new(37.77, -122.42); 10];
    inside[9] = GpsPoint::new(37.7717, -122.42);
    assert!(check_loop_closure(&inside).is_closed);

    let mut outside = inside.clone();
    outside[9] = GpsPoint::new(37.7719, -122.42);
    assert!(!check_loop_closure(&outside).is_closed);
}

#[test]
fn test_nan_endpoint() {
    let mut path = square_path(37.77, -122.42, 0.0005, 5);
    path[0] = GpsPoint::new(f64::NAN, -122.42);
    let closure = check_loop_closure(&path);
    assert!(!closure.is_closed);
    assert!(closure.distance.is_infinite());

    let mut path = square_path(37.77, -122.42, 0.0005, 5);
    let last = path.len() - 1;
    path[last] = GpsPoint::new(37.77, f64::NAN);
    assert!(!check_loop_closure(&path).is_closed);
}

#[test]
fn test_nan_in_the_middle_is_ignored() {
    let mut path = square_path(37.77, -122.42, 0.0005, 5);
    path[7] = GpsPoint::new(f64::NAN, f64::NAN);
    assert!(check_loop_closure(&path).is_closed);
}

#[test]
fn test_custom_threshold() {
    let path = square_path(37.77, -122.42, 0.0005, 5);
    let strict = TerritoryConfig {
        loop_closure_threshold: 1.0,
        ..TerritoryConfig::default()
    };
    let closure = check_loop_closure_with(&path, &strict);
    assert!(!closure.is_closed);
    assert!(closure.distance.is_finite());
}

#[test]
fn test_empty_path() {
    let closure = check_loop_closure(&[]);
    assert!(!closure.is_closed);
    assert_eq!(closure.distance, f64::INFINITY);
}
