//! Collaborator seams. The planner only ever talks to these three narrow
//! traits, so tests drive it with in-memory fakes instead of live services.

pub mod remote;

use std::future::Future;

use chrono::{DateTime, Utc};
use shared::{Coordinate, ElevationSample, RouteAlternative, WeatherObservation};

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionsOptions {
    pub avoid_highways: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    /// The service answered but found no path between the waypoints.
    /// Distinct from transport failure so the surface can say so.
    #[error("no route found between the requested waypoints")]
    NoRoute,
    #[error("directions service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("elevation service unavailable: {0}")]
    Unavailable(String),
}

pub trait DirectionsProvider: Send + Sync {
    /// Fetch candidate routes through the given waypoints. An empty result
    /// set is an error (`NoRoute`), never an empty `Ok`.
    fn directions(
        &self,
        waypoints: &[Coordinate],
        options: DirectionsOptions,
    ) -> impl Future<Output = Result<Vec<RouteAlternative>, DirectionsError>> + Send;
}

pub trait WeatherProvider: Send + Sync {
    /// Point weather for one location, optionally at a specific time.
    /// Returns `None` on any failure; never errors into the caller.
    fn weather_at(
        &self,
        coord: Coordinate,
        at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Option<WeatherObservation>> + Send;
}

pub trait ElevationProvider: Send + Sync {
    /// Elevation profile along a route geometry, ordered by distance from
    /// the start.
    fn elevation_profile(
        &self,
        geometry: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<ElevationSample>, ElevationError>> + Send;
}
