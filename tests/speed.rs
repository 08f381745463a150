//! Tests for speed plausibility classification.

use turfclaim::{
    validate_path_speeds, validate_speed, ActivityType, GpsPoint, SpeedViolation,
    TerritoryError,
};

fn at_speed(speed: f64) -> GpsPoint {
    GpsPoint::with_speed(37.77, -122.42, 0, speed)
}

#[test]
fn test_missing_speed_is_valid() {
    let point = GpsPoint::new(37.77, -122.42);
    for activity in [ActivityType::Walk, ActivityType::Run, ActivityType::Ride] {
        let verdict = validate_speed(&point, activity);
        assert!(verdict.valid);
        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.suggested, None);
        assert!(!verdict.suspicious);
    }
}

#[test]
fn test_unknown_sensor_speed_is_valid() {
    assert!(validate_speed(&at_speed(-1.0), ActivityType::Walk).valid);
    assert!(validate_speed(&at_speed(f64::NAN), ActivityType::Walk).valid);
}

#[test]
fn test_speeds_inside_envelope() {
    assert!(validate_speed(&at_speed(1.4), ActivityType::Walk).valid);
    assert!(validate_speed(&at_speed(0.0), ActivityType::Walk).valid);
    assert!(validate_speed(&at_speed(3.5), ActivityType::Run).valid);
    assert!(validate_speed(&at_speed(12.0), ActivityType::Ride).valid);
}

#[test]
fn test_envelope_upper_bound_is_inclusive() {
    assert!(validate_speed(&at_speed(2.5), ActivityType::Walk).valid);
    assert!(validate_speed(&at_speed(7.0), ActivityType::Run).valid);
    assert!(validate_speed(&at_speed(20.0), ActivityType::Ride).valid);
}

#[test]
fn test_fast_walk_suggests_run() {
    let verdict = validate_speed(&at_speed(4.0), ActivityType::Walk);
    assert!(!verdict.valid);
    assert_eq!(verdict.reason, Some(SpeedViolation::TooFastForWalk));
    assert_eq!(verdict.suggested, Some(ActivityType::Run));
    assert!(!verdict.suspicious);
}

#[test]
fn test_fast_run_is_suspicious() {
    let verdict = validate_speed(&at_speed(9.0), ActivityType::Run);
    assert!(!verdict.valid);
    assert_eq!(verdict.reason, Some(SpeedViolation::TooFastForRun));
    assert_eq!(verdict.suggested, None);
    assert!(verdict.suspicious);
}

#[test]
fn test_fast_ride_is_suspicious() {
    let verdict = validate_speed(&at_speed(30.0), ActivityType::Ride);
    assert!(!verdict.valid);
    assert_eq!(verdict.reason, Some(SpeedViolation::TooFastForRide));
    assert_eq!(verdict.suggested, None);
    assert!(verdict.suspicious);
}

#[test]
fn test_envelopes() {
    assert_eq!(ActivityType::Walk.envelope().max, 2.5);
    assert_eq!(ActivityType::Run.envelope().max, 7.0);
    assert_eq!(ActivityType::Ride.envelope().max, 20.0);
    assert!(ActivityType::Run.envelope().contains(5.0));
    assert!(!ActivityType::Run.envelope().contains(7.5));
    for activity in [ActivityType::Walk, ActivityType::Run, ActivityType::Ride] {
        assert_eq!(activity.envelope().min, 0.0);
        assert!(activity.envelope().contains(0.0));
        assert!(!activity.envelope().contains(-0.1));
    }
}

#[test]
fn test_standing_still_is_valid() {
    for activity in [ActivityType::Walk, ActivityType::Run, ActivityType::Ride] {
        assert!(validate_speed(&at_speed(0.0), activity).valid);
    }
}

#[test]
fn test_activity_type_parsing() {
    assert_eq!("walk".parse::<ActivityType>().unwrap(), ActivityType::Walk);
    assert_eq!("RUN".parse::<ActivityType>().unwrap(), ActivityType::Run);
    assert_eq!(" Ride ".parse::<ActivityType>().unwrap(), ActivityType::Ride);
    assert_eq!(
        "swim".parse::<ActivityType>().unwrap_err(),
        TerritoryError::UnknownActivityType("swim".to_string())
    );
    assert_eq!(ActivityType::Ride.to_string(), "ride");
}

#[test]
fn test_activity_type_serde() {
    let json = serde_json::to_string(&ActivityType::Walk).unwrap();
    assert_eq!(json, "\"WALK\"");
    let parsed: ActivityType = serde_json::from_str("\"RIDE\"").unwrap();
    assert_eq!(parsed, ActivityType::Ride);
}

#[test]
fn test_path_report() {
    let path = vec![
        at_speed(1.0),
        at_speed(3.0),
        GpsPoint::new(37.77, -122.42),
        at_speed(2.0),
        at_speed(-1.0),
        at_speed(5.0),
    ];

    let report = validate_path_speeds(&path, ActivityType::Walk);

    assert_eq!(report.checked, 4);
    assert_eq!(report.invalid, 2);
    assert_eq!(report.suspicious, 0);
    assert_eq!(report.suggested, Some(ActivityType::Run));
}

#[test]
fn test_path_report_for_run() {
    let path: Vec<GpsPoint> = [3.0, 4.0, 11.0, 3.5].iter().map(|s| at_speed(*s)).collect();

    let report = validate_path_speeds(&path, ActivityType::Run);

    assert_eq!(report.checked, 4);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.suspicious, 1);
    assert_eq!(report.suggested, None);
}

#[test]
fn test_empty_path_report() {
    let report = validate_path_speeds(&[], ActivityType::Ride);
    assert_eq!(report, Default::default());
}
