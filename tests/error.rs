//! Tests for error module

use turfclaim::error::{OptionExt, TerritoryError};

#[test]
fn test_error_display() {
    let err = TerritoryError::InsufficientPoints {
        activity_id: "test-1".to_string(),
        point_count: 7,
        minimum_required: 10,
    };
    assert!(err.to_string().contains("test-1"));
    assert!(err.to_string().contains("7 points"));
}

#[test]
fn test_area_too_small_display() {
    let err = TerritoryError::AreaTooSmall {
        area: 3.5,
        minimum: 10.0,
    };
    assert!(err.to_string().contains("3.50"));
    assert!(err.to_string().contains("10.00"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_insufficient_points("test", 0, 10);
    assert!(matches!(
        result,
        Err(TerritoryError::InsufficientPoints { .. })
    ));

    let none: Option<i32> = None;
    let result = none.ok_or_geometry("centroid", "empty");
    assert!(matches!(
        result,
        Err(TerritoryError::GeometryFailure {
            operation: "centroid",
            ..
        })
    ));

    assert_eq!(Some(3).ok_or_geometry("centroid", "empty"), Ok(3));
}
