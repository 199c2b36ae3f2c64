//! HTTP-backed provider implementations: an OSRM-compatible directions
//! endpoint, a point weather API, and a batch elevation API. Each maps
//! transport and decoding failures into its trait's failure channel.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use shared::{Coordinate, ElevationSample, RouteAlternative, RouteLeg, RouteStep, WeatherObservation};

use super::{
    DirectionsError, DirectionsOptions, DirectionsProvider, ElevationError, ElevationProvider,
    WeatherProvider,
};
use crate::geometry::distance_between;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

fn http_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .expect("http client")
}

// --- directions ---

pub struct OsrmDirections {
    client: Client,
    base_url: String,
}

impl OsrmDirections {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Deserialize)]
struct OsrmStep {
    #[serde(default)]
    name: String,
    #[serde(rename = "ref", default)]
    road_ref: String,
    distance: f64,
}

impl From<OsrmRoute> for RouteAlternative {
    fn from(route: OsrmRoute) -> Self {
        RouteAlternative {
            geometry: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate { lat, lon })
                .collect(),
            distance_m: route.distance,
            duration_s: route.duration,
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    steps: leg
                        .steps
                        .into_iter()
                        .map(|step| RouteStep {
                            name: step.name,
                            road_ref: step.road_ref,
                            distance_m: step.distance,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Only codes meaning "the network holds no such route" become `NoRoute`;
/// anything else is a service-side error and keeps the outage channel.
fn routes_from_response(body: OsrmResponse) -> Result<Vec<RouteAlternative>, DirectionsError> {
    match body.code.as_str() {
        "Ok" if body.routes.is_empty() => Err(DirectionsError::NoRoute),
        "Ok" => Ok(body.routes.into_iter().map(RouteAlternative::from).collect()),
        "NoRoute" | "NoSegment" => Err(DirectionsError::NoRoute),
        other => Err(DirectionsError::Unavailable(format!(
            "directions service rejected the request: {other}"
        ))),
    }
}

impl DirectionsProvider for OsrmDirections {
    async fn directions(
        &self,
        waypoints: &[Coordinate],
        options: DirectionsOptions,
    ) -> Result<Vec<RouteAlternative>, DirectionsError> {
        let pairs: Vec<String> = waypoints
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect();
        let mut url = format!(
            "{}/route/v1/cycling/{}?alternatives=true&steps=true&geometries=geojson&overview=full",
            self.base_url.trim_end_matches('/'),
            pairs.join(";")
        );
        if options.avoid_highways {
            url.push_str("&exclude=motorway");
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectionsError::Unavailable(e.to_string()))?;
        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::Unavailable(format!("bad directions payload: {e}")))?;

        if body.code != "Ok" {
            tracing::info!(code = %body.code, "directions returned non-Ok code");
        } else {
            tracing::debug!("directions returned {} alternative(s)", body.routes.len());
        }
        routes_from_response(body)
    }
}

// --- weather ---

pub struct PointWeather {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PointWeather {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct PointWeatherPayload {
    wind_deg: f64,
    wind_speed: f64,
    #[serde(default)]
    wind_gust: Option<f64>,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
    #[serde(default)]
    dt: Option<i64>,
}

impl WeatherProvider for PointWeather {
    async fn weather_at(
        &self,
        coord: Coordinate,
        at: Option<DateTime<Utc>>,
    ) -> Option<WeatherObservation> {
        let mut url = format!(
            "{}/point?lat={}&lon={}",
            self.base_url.trim_end_matches('/'),
            coord.lat,
            coord.lon
        );
        if let Some(at) = at {
            url.push_str(&format!("&dt={}", at.timestamp()));
        }
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&appid={key}"));
        }

        let payload: PointWeatherPayload = match self.client.get(&url).send().await {
            Ok(response) => match response.json().await {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!("weather payload decode failed: {err}");
                    return None;
                }
            },
            Err(err) => {
                tracing::warn!("weather fetch failed: {err}");
                return None;
            }
        };

        Some(WeatherObservation {
            wind_origin_deg: payload.wind_deg.rem_euclid(360.0),
            wind_speed_ms: payload.wind_speed,
            gust_ms: payload.wind_gust,
            temperature_c: payload.temp,
            humidity_pct: payload.humidity,
            observed_at_unix: payload.dt,
        })
    }
}

// --- elevation ---

pub struct TerrainElevation {
    client: Client,
    base_url: String,
}

impl TerrainElevation {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct ElevationPayload {
    results: Vec<ElevationResult>,
}

#[derive(Deserialize)]
struct ElevationResult {
    elevation: f64,
}

impl ElevationProvider for TerrainElevation {
    async fn elevation_profile(
        &self,
        geometry: &[Coordinate],
    ) -> Result<Vec<ElevationSample>, ElevationError> {
        if geometry.is_empty() {
            return Ok(Vec::new());
        }
        let locations: Vec<_> = geometry
            .iter()
            .map(|c| json!({"latitude": c.lat, "longitude": c.lon}))
            .collect();
        let url = format!("{}/elevation", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&json!({ "locations": locations }))
            .send()
            .await
            .map_err(|e| ElevationError::Unavailable(e.to_string()))?;
        let payload: ElevationPayload = response
            .json()
            .await
            .map_err(|e| ElevationError::Unavailable(format!("bad elevation payload: {e}")))?;

        if payload.results.len() != geometry.len() {
            return Err(ElevationError::Unavailable(format!(
                "elevation result count {} does not match {} query points",
                payload.results.len(),
                geometry.len()
            )));
        }

        let mut travelled_m = 0.0;
        let samples = geometry
            .iter()
            .zip(payload.results)
            .enumerate()
            .map(|(i, (coord, result))| {
                if i > 0 {
                    travelled_m += distance_between(geometry[i - 1], *coord);
                }
                ElevationSample {
                    distance_km: travelled_m / 1_000.0,
                    elevation_m: result.elevation,
                    coord: *coord,
                }
            })
            .collect();
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osrm_route_converts_to_alternative() {
        let raw = serde_json::json!({
            "geometry": {"coordinates": [[-0.1, 51.5], [-0.09, 51.51]]},
            "distance": 1500.0,
            "duration": 320.0,
            "legs": [{"steps": [
                {"name": "Abbey Road", "distance": 700.0},
                {"name": "", "ref": "A406", "distance": 800.0}
            ]}]
        });
        let route: OsrmRoute = serde_json::from_value(raw).unwrap();
        let alternative = RouteAlternative::from(route);

        assert_eq!(alternative.geometry.len(), 2);
        assert_eq!(alternative.geometry[0].lat, 51.5);
        assert_eq!(alternative.geometry[0].lon, -0.1);
        let steps: Vec<_> = alternative.steps().collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].road_ref, "A406");
    }

    #[test]
    fn directions_codes_map_to_distinct_failures() {
        let no_route: OsrmResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "routes": []}"#).unwrap();
        assert!(matches!(
            routes_from_response(no_route),
            Err(DirectionsError::NoRoute)
        ));

        let ok_empty: OsrmResponse =
            serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(matches!(
            routes_from_response(ok_empty),
            Err(DirectionsError::NoRoute)
        ));

        // A rejected request is an outage from the rider's point of view,
        // not an absence of routes.
        let bad_query: OsrmResponse =
            serde_json::from_str(r#"{"code": "InvalidQuery", "routes": []}"#).unwrap();
        assert!(matches!(
            routes_from_response(bad_query),
            Err(DirectionsError::Unavailable(_))
        ));
    }

    #[test]
    fn weather_payload_tolerates_missing_optionals() {
        let payload: PointWeatherPayload =
            serde_json::from_str(r#"{"wind_deg": 270.0, "wind_speed": 6.2}"#).unwrap();
        assert_eq!(payload.wind_deg, 270.0);
        assert!(payload.wind_gust.is_none());
        assert!(payload.dt.is_none());
    }
}
