use std::{net::SocketAddr, sync::Arc};

use backend::{AppState, create_router, planner::RoutePlanner};
use backend::providers::remote::{OsrmDirections, PointWeather, TerrainElevation};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Wind-aware cycling route comparison service")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// OSRM-compatible directions endpoint.
    #[arg(long, default_value = "https://router.project-osrm.org")]
    directions_url: String,
    #[arg(long, default_value = "https://weather.example.com/v1")]
    weather_url: String,
    /// API key for the weather service, if it requires one.
    #[arg(long, env = "WEATHER_API_KEY")]
    weather_api_key: Option<String>,
    #[arg(long, default_value = "https://api.open-elevation.com/api/v1")]
    elevation_url: String,
    /// Base URL for radar imagery products served to playback clients.
    #[arg(long, default_value = "https://radar.example.com/tiles")]
    radar_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let planner = RoutePlanner::new(
        OsrmDirections::new(args.directions_url.as_str()),
        PointWeather::new(args.weather_url.as_str(), args.weather_api_key.clone()),
        TerrainElevation::new(args.elevation_url.as_str()),
    );
    tracing::info!(
        "providers wired: directions={} weather={} elevation={}",
        args.directions_url,
        args.weather_url,
        args.elevation_url
    );

    let state = AppState {
        planner: Arc::new(planner),
        radar_base_url: args.radar_url,
    };
    let app = create_router(state);

    tracing::info!("starting backend on http://{}", args.listen);
    axum::serve(
        tokio::net::TcpListener::bind(args.listen).await.unwrap(),
        app,
    )
    .await
    .unwrap();
}
