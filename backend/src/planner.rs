use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use shared::{
    Coordinate, ElevationSample, PlanRequest, RouteAlternative, ScoredRoute, WeatherObservation,
};
use tokio::time::timeout;

use crate::characteristics;
use crate::error::PlanError;
use crate::geometry::GeometryError;
use crate::providers::{DirectionsOptions, DirectionsProvider, ElevationProvider, WeatherProvider};
use crate::scoring::{self, RankingInput};
use crate::wind::{self, WindExposure};

/// Ceiling on one directions round trip; beyond this the plan fails into a
/// user-visible "try again" rather than hanging.
const DIRECTIONS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Best-first; index 0 is the recommendation.
    pub routes: Vec<ScoredRoute>,
    /// True when any collaborator fallback was taken; the surface shows a
    /// soft warning but the ranking is still complete.
    pub degraded: bool,
}

/// Stateless route comparison: a snapshot of waypoints and preferences in,
/// a ranked set of alternatives out. The only mutable state is a request
/// generation counter implementing last-request-wins, so a dragged waypoint
/// can never be answered by a stale in-flight computation.
pub struct RoutePlanner<D, W, E> {
    directions: D,
    weather: W,
    elevation: E,
    generation: AtomicU64,
}

impl<D, W, E> RoutePlanner<D, W, E>
where
    D: DirectionsProvider,
    W: WeatherProvider,
    E: ElevationProvider,
{
    pub fn new(directions: D, weather: W, elevation: E) -> Self {
        Self {
            directions,
            weather,
            elevation,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome, PlanError> {
        if request.waypoints.len() < 2 {
            return Err(GeometryError::InvalidGeometry.into());
        }
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let options = DirectionsOptions {
            avoid_highways: request.preferences.avoid_highways,
        };
        let alternatives = match timeout(
            DIRECTIONS_TIMEOUT,
            self.directions.directions(&request.waypoints, options),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(PlanError::CollaboratorUnavailable(
                    "directions request timed out".into(),
                ))
            }
        };
        if alternatives.is_empty() {
            return Err(PlanError::NoRouteFound);
        }

        let mut degraded = false;

        // One baseline fetch backs the scoring when per-sample weather is
        // entirely missing; bearing 0 if even that fails. Ranking always
        // completes, degraded rather than blocked.
        let baseline = self
            .weather
            .weather_at(request.waypoints[0], None)
            .await
            .unwrap_or_else(|| {
                tracing::warn!("baseline weather unavailable, scoring against bearing 0");
                degraded = true;
                WeatherObservation::from_bearing(0.0)
            });

        let mut inputs = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let characteristics =
                characteristics::analyze(alternative.steps(), alternative.distance_m);

            let (wind_exposure, wind_degraded) =
                self.route_wind_exposure(&alternative.geometry, baseline).await;
            degraded |= wind_degraded;

            let ascent_m = match self.elevation.elevation_profile(&alternative.geometry).await {
                Ok(profile) => total_ascent_m(&profile),
                Err(err) => {
                    tracing::warn!("elevation unavailable, scoring with 0 m ascent: {err}");
                    degraded = true;
                    0.0
                }
            };

            inputs.push(RankingInput {
                alternative,
                wind: wind_exposure,
                characteristics,
                ascent_m,
            });
        }

        let routes = scoring::rank(inputs, request.preferences);

        // All per-candidate work is done; drop the result if a newer request
        // arrived while it was in flight.
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!("plan generation {ticket} superseded, discarding result");
            return Err(PlanError::StaleRequestDiscarded);
        }
        Ok(PlanOutcome { routes, degraded })
    }

    /// Sampled wind exposure for one candidate. Per-sample failures classify
    /// as crosswind inside the aggregation; a fully failed batch falls back
    /// to the baseline bearing instead so the wind axis still differentiates
    /// the alternatives.
    async fn route_wind_exposure(
        &self,
        geometry: &[Coordinate],
        baseline: WeatherObservation,
    ) -> (WindExposure, bool) {
        if geometry.len() < 2 {
            return (WindExposure::degenerate(), false);
        }
        let indices = wind::sample_indices(geometry.len());
        let fetches = indices.iter().map(|&i| self.weather.weather_at(geometry[i], None));
        let samples = wind::pad_samples(join_all(fetches).await, indices.len());

        let missing = samples.iter().filter(|s| s.is_none()).count();
        if missing == samples.len() {
            tracing::warn!(
                "all {} weather samples failed, classifying against baseline bearing",
                samples.len()
            );
            let fallback = vec![Some(baseline); indices.len()];
            return (wind::aggregate_wind_exposure(geometry, &fallback), true);
        }
        if missing > 0 {
            tracing::debug!("{missing}/{} weather samples missing", samples.len());
        }
        (wind::aggregate_wind_exposure(geometry, &samples), missing > 0)
    }
}

/// Cumulative positive elevation gain across consecutive profile points.
pub fn total_ascent_m(profile: &[ElevationSample]) -> f64 {
    profile
        .windows(2)
        .map(|pair| (pair[1].elevation_m - pair[0].elevation_m).max(0.0))
        .filter(|delta| delta.is_finite())
        .sum()
}

/// Convenience for surfaces that already hold the candidates and only need
/// the pure scoring pass: no I/O, no fallbacks.
pub fn score_alternatives(
    alternatives: Vec<RouteAlternative>,
    exposures: Vec<WindExposure>,
    ascents_m: Vec<f64>,
    preferences: shared::RoutePreferences,
) -> Vec<ScoredRoute> {
    let inputs = alternatives
        .into_iter()
        .zip(exposures)
        .zip(ascents_m)
        .map(|((alternative, wind), ascent_m)| {
            let characteristics =
                characteristics::analyze(alternative.steps(), alternative.distance_m);
            RankingInput {
                alternative,
                wind,
                characteristics,
                ascent_m,
            }
        })
        .collect();
    scoring::rank(inputs, preferences)
}
