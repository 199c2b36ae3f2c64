use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Point-in-time wind/weather reading for one location.
/// `wind_origin_deg` follows the meteorological convention: the compass
/// direction the wind blows *from*, degrees clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub wind_origin_deg: f64,
    pub wind_speed_ms: f64,
    #[serde(default)]
    pub gust_ms: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    /// Unix seconds of the reading, when the source reports one.
    #[serde(default)]
    pub observed_at_unix: Option<i64>,
}

impl WeatherObservation {
    /// Bare reading carrying only a wind-origin bearing, used when a
    /// degraded plan falls back to a single baseline bearing.
    pub fn from_bearing(wind_origin_deg: f64) -> Self {
        Self {
            wind_origin_deg,
            wind_speed_ms: 0.0,
            gust_ms: None,
            temperature_c: None,
            humidity_pct: None,
            observed_at_unix: None,
        }
    }
}

/// One maneuver of a directions leg. Only the free-text road name/reference
/// and the distance covered matter here; step geometry stays with the
/// directions service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub road_ref: String,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub steps: Vec<RouteStep>,
}

/// One complete candidate path returned by the directions service for a
/// given waypoint set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAlternative {
    pub geometry: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub legs: Vec<RouteLeg>,
}

impl RouteAlternative {
    pub fn steps(&self) -> impl Iterator<Item = &RouteStep> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoutePreferences {
    #[serde(default)]
    pub prefer_scenic: bool,
    #[serde(default)]
    pub avoid_a_roads: bool,
    #[serde(default)]
    pub avoid_highways: bool,
}

/// One point of an elevation profile, ordered by distance from route start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ElevationSample {
    pub distance_km: f64,
    pub elevation_m: f64,
    pub coord: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    Depart,
    Arrive,
}

/// Journey timing as clients send it: a unix-second anchor which is either
/// the departure or the required arrival instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JourneyWindow {
    pub anchor_unix: i64,
    pub duration_hours: f64,
    pub mode: TimingMode,
}

/// Per-alternative metrics, recomputed from scratch whenever waypoints,
/// preferences, or wind change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteScore {
    pub tail_pct: u8,
    pub head_pct: u8,
    pub cross_pct: u8,
    pub a_road_pct: u8,
    pub motorway_pct: u8,
    pub cycle_lane_pct: u8,
    pub scenic_pct: u8,
    pub ascent_m: f64,
    pub composite: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRoute {
    pub alternative: RouteAlternative,
    pub score: RouteScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub waypoints: Vec<Coordinate>,
    #[serde(default)]
    pub preferences: RoutePreferences,
    #[serde(default)]
    pub journey: Option<JourneyWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    /// Best-first; index 0 is the recommended alternative.
    pub routes: Vec<ScoredRoute>,
    pub recommended_index: usize,
    /// True when any collaborator fallback was taken while scoring.
    pub degraded: bool,
}

/// Which weather imagery product a playback position maps to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherProductInfo {
    pub kind: ProductKind,
    #[serde(default)]
    pub valid_at_unix: Option<i64>,
    #[serde(default)]
    pub model_run_unix: Option<i64>,
    #[serde(default)]
    pub lead_minutes: Option<i64>,
    #[serde(default)]
    pub lead_hours: Option<i64>,
    pub radar_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Observation,
    Forecast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
