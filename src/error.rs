//! Error types for territory building and overlap resolution.
//!
//! Public operations never surface these across the component boundary:
//! they degrade to `None` or an empty/partial result. The typed errors are
//! what the internal steps propagate with `?`, and what `build_territory`
//! hands to callers that want the rejection reason.

use thiserror::Error;

/// Reasons a claim or a single territory comparison can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerritoryError {
    /// Too few usable GPS points to form a territory.
    #[error("activity {activity_id} has {point_count} points, need at least {minimum_required}")]
    InsufficientPoints {
        activity_id: String,
        point_count: usize,
        minimum_required: usize,
    },

    /// The enclosed area is below the noise floor.
    #[error("enclosed area {area:.2} m² is below the {minimum:.2} m² minimum")]
    AreaTooSmall { area: f64, minimum: f64 },

    /// A stored ring cannot form a polygon.
    #[error("territory {territory_id} ring has {vertex_count} coordinates")]
    DegenerateRing {
        territory_id: String,
        vertex_count: usize,
    },

    /// The geometry backend rejected or mangled the input.
    #[error("geometry operation '{operation}' failed: {detail}")]
    GeometryFailure {
        operation: &'static str,
        detail: String,
    },

    #[error("unknown activity type '{0}' (expected walk, run or ride)")]
    UnknownActivityType(String),
}

impl TerritoryError {
    pub fn geometry(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::GeometryFailure {
            operation,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TerritoryError>;

/// Conversions from `Option` into territory errors.
pub trait OptionExt<T> {
    fn ok_or_insufficient_points(
        self,
        activity_id: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T>;

    fn ok_or_geometry(self, operation: &'static str, detail: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_points(
        self,
        activity_id: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| TerritoryError::InsufficientPoints {
            activity_id: activity_id.to_string(),
            point_count,
            minimum_required,
        })
    }

    fn ok_or_geometry(self, operation: &'static str, detail: &str) -> Result<T> {
        self.ok_or_else(|| TerritoryError::geometry(operation, detail))
    }
}
