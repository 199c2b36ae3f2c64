use thiserror::Error;

use crate::geometry::GeometryError;
use crate::providers::DirectionsError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("route planning needs at least two waypoints")]
    InvalidGeometry(#[from] GeometryError),
    /// The directions service answered with zero alternatives. Actionable
    /// for the user; not retried automatically.
    #[error("no route found between the requested waypoints")]
    NoRouteFound,
    /// A collaborator failed or timed out in a way that prevented planning
    /// entirely. Per-route fallbacks (crosswind, zero ascent) never raise
    /// this; only a missing set of candidate routes does.
    #[error("{0}")]
    CollaboratorUnavailable(String),
    /// A newer plan request superseded this one; the result is dropped
    /// silently rather than shown.
    #[error("superseded by a newer route request")]
    StaleRequestDiscarded,
}

impl From<DirectionsError> for PlanError {
    fn from(err: DirectionsError) -> Self {
        match err {
            DirectionsError::NoRoute => PlanError::NoRouteFound,
            DirectionsError::Unavailable(msg) => PlanError::CollaboratorUnavailable(msg),
        }
    }
}
