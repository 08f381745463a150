//! Per-sample speed plausibility for a declared activity type.
//!
//! This only classifies; callers decide whether to drop the point, flag the
//! activity or suggest a different activity type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TerritoryError;
use crate::GpsPoint;

/// Declared activity type of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Walk,
    Run,
    Ride,
}

/// Allowed speed range in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedEnvelope {
    pub min: f64,
    pub max: f64,
}

impl SpeedEnvelope {
    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.min && speed <= self.max
    }
}

impl ActivityType {
    /// Fixed speed envelope for this activity type.
    pub fn envelope(self) -> SpeedEnvelope {
        match self {
            // ~9 km/h
            ActivityType::Walk => SpeedEnvelope { min: 0.0, max: 2.5 },
            // ~25 km/h
            ActivityType::Run => SpeedEnvelope { min: 0.0, max: 7.0 },
            // ~72 km/h
            ActivityType::Ride => SpeedEnvelope { min: 0.0, max: 20.0 },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Walk => "walk",
            ActivityType::Run => "run",
            ActivityType::Ride => "ride",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = TerritoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(ActivityType::Walk),
            "run" => Ok(ActivityType::Run),
            "ride" => Ok(ActivityType::Ride),
            _ => Err(TerritoryError::UnknownActivityType(s.to_string())),
        }
    }
}

/// Why a sample was classified as implausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeedViolation {
    TooFastForWalk,
    TooFastForRun,
    TooFastForRide,
}

/// Verdict for a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedVerdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SpeedViolation>,
    /// Activity type the sample fits better, when there is an obvious one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested: Option<ActivityType>,
    /// Too fast for any honest run or ride
    #[serde(default)]
    pub suspicious: bool,
}

impl SpeedVerdict {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            suggested: None,
            suspicious: false,
        }
    }
}

/// Classify a sample's speed against the activity envelope.
///
/// A missing (or negative, i.e. sensor "unknown") speed cannot be judged
/// and is valid. Standing still is normal.
///
/// # Example
/// ```
/// use turfclaim::{validate_speed, ActivityType, GpsPoint, SpeedViolation};
///
/// let point = GpsPoint::with_speed(37.77, -122.42, 0, 4.0);
/// let verdict = validate_speed(&point, ActivityType::Walk);
/// assert!(!verdict.valid);
/// assert_eq!(verdict.reason, Some(SpeedViolation::TooFastForWalk));
/// assert_eq!(verdict.suggested, Some(ActivityType::Run));
/// ```
pub fn validate_speed(point: &GpsPoint, activity_type: ActivityType) -> SpeedVerdict {
    let Some(speed) = point.speed.filter(|s| s.is_finite() && *s >= 0.0) else {
        return SpeedVerdict::valid();
    };

    // Every envelope starts at 0, so a failed check means too fast
    if activity_type.envelope().contains(speed) {
        return SpeedVerdict::valid();
    }

    match activity_type {
        ActivityType::Walk => SpeedVerdict {
            valid: false,
            reason: Some(SpeedViolation::TooFastForWalk),
            suggested: Some(ActivityType::Run),
            suspicious: false,
        },
        ActivityType::Run => SpeedVerdict {
            valid: false,
            reason: Some(SpeedViolation::TooFastForRun),
            suggested: None,
            suspicious: true,
        },
        ActivityType::Ride => SpeedVerdict {
            valid: false,
            reason: Some(SpeedViolation::TooFastForRide),
            suggested: None,
            suspicious: true,
        },
    }
}

/// Aggregate of per-sample verdicts over a whole path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedReport {
    /// Samples that carried a usable speed
    pub checked: usize,
    pub invalid: usize,
    pub suspicious: usize,
    /// Set when at least one sample suggested another activity type
    pub suggested: Option<ActivityType>,
}

/// Validate every sample of a path.
pub fn validate_path_speeds(path: &[GpsPoint], activity_type: ActivityType) -> SpeedReport {
    let mut report = SpeedReport::default();
    for point in path {
        if point.speed.is_some_and(|s| s.is_finite() && s >= 0.0) {
            report.checked += 1;
        }
        let verdict = validate_speed(point, activity_type);
        if !verdict.valid {
            report.invalid += 1;
        }
        if verdict.suspicious {
            report.suspicious += 1;
        }
        if report.suggested.is_none() {
            report.suggested = verdict.suggested;
        }
    }
    report
}
