pub mod characteristics;
pub mod error;
pub mod forecast;
pub mod geometry;
pub mod planner;
pub mod providers;
pub mod scoring;
pub mod wind;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use shared::{ApiError, JourneyWindow, PlanRequest, PlanResponse, TimingMode};
use tower_http::cors::{Any, CorsLayer};

use crate::error::PlanError;
use crate::forecast::{product_info, project_time, select_weather_product};
use crate::planner::RoutePlanner;
use crate::providers::{DirectionsProvider, ElevationProvider, WeatherProvider};

pub struct AppState<D, W, E> {
    pub planner: Arc<RoutePlanner<D, W, E>>,
    pub radar_base_url: String,
}

impl<D, W, E> Clone for AppState<D, W, E> {
    fn clone(&self) -> Self {
        Self {
            planner: Arc::clone(&self.planner),
            radar_base_url: self.radar_base_url.clone(),
        }
    }
}

pub fn create_router<D, W, E>(state: AppState<D, W, E>) -> Router
where
    D: DirectionsProvider + 'static,
    W: WeatherProvider + 'static,
    E: ElevationProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/plan", post(plan_handler::<D, W, E>))
        .route(
            "/api/weather-product",
            get(weather_product_handler::<D, W, E>),
        )
        .layer(cors)
        .with_state(state)
}

async fn plan_handler<D, W, E>(
    State(state): State<AppState<D, W, E>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ApiError>)>
where
    D: DirectionsProvider + 'static,
    W: WeatherProvider + 'static,
    E: ElevationProvider + 'static,
{
    let outcome = state.planner.plan(&request).await.map_err(plan_error)?;
    Ok(Json(PlanResponse {
        recommended_index: 0,
        degraded: outcome.degraded,
        routes: outcome.routes,
    }))
}

fn plan_error(err: PlanError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        PlanError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
        PlanError::NoRouteFound => StatusCode::NOT_FOUND,
        PlanError::CollaboratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        // Only ever seen by a client that already sent a newer request.
        PlanError::StaleRequestDiscarded => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct WeatherProductQuery {
    pub progress: f64,
    pub anchor_unix: i64,
    pub duration_hours: f64,
    pub mode: TimingMode,
}

/// Playback support: map a progress fraction along the journey to the
/// weather imagery product covering that simulated instant.
async fn weather_product_handler<D, W, E>(
    State(state): State<AppState<D, W, E>>,
    Query(query): Query<WeatherProductQuery>,
) -> impl IntoResponse
where
    D: DirectionsProvider + 'static,
    W: WeatherProvider + 'static,
    E: ElevationProvider + 'static,
{
    let journey = JourneyWindow {
        anchor_unix: query.anchor_unix,
        duration_hours: query.duration_hours,
        mode: query.mode,
    };
    let simulated = project_time(query.progress, journey);
    let product = select_weather_product(simulated, Utc::now());
    Json(product_info(&product, &state.radar_base_url))
}
