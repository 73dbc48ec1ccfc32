//! Query server for point-in-polygon lookups.
//!
//! Loads a GeoJSON polygon collection at startup and answers which polygons
//! contain a given point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use geo::Coord;
use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pipcheck::models::feature_collection_from_str;
use pipcheck::{Classification, PipOptions, PipService, PolygonFeature};

mod config;
use config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Point-in-polygon query server")]
struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// GeoJSON file with the polygons to serve
    #[arg(short, long)]
    polygons: Option<PathBuf>,

    /// Report boundary points as not contained by default
    #[arg(long)]
    ignore_boundary: bool,
}

/// Application state shared across handlers
struct AppState {
    service: PipService,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let listen = args
        .listen
        .or(config.server.listen)
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let polygons_path = args
        .polygons
        .or(config.data.polygons)
        .context("No polygon file given (--polygons or [data].polygons)")?;
    let options = PipOptions::ignore_boundary(args.ignore_boundary || config.pip.ignore_boundary);

    info!("pipcheck Query Server");
    info!("Loading polygons from {}", polygons_path.display());

    let text = std::fs::read_to_string(&polygons_path)
        .with_context(|| format!("Failed to read {}", polygons_path.display()))?;
    let collection = feature_collection_from_str(&text).context("Failed to parse polygon GeoJSON")?;
    let features = collection
        .features
        .iter()
        .map(PolygonFeature::from_geojson)
        .collect::<pipcheck::Result<Vec<_>>>()
        .context("Invalid polygon feature")?;
    let service = PipService::from_features(features, options)?;

    let state = Arc::new(AppState { service });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/lookup", get(lookup_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        polygons: state.service.index().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    polygons: usize,
}

/// Polygons containing a point
async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupQueryParams>,
) -> Result<Json<LookupResponse>, (StatusCode, String)> {
    if !(params.point_lon.is_finite() && params.point_lat.is_finite()) {
        return Err((
            StatusCode::BAD_REQUEST,
            "point coordinates must be finite".to_string(),
        ));
    }

    let start = Instant::now();
    let options = params
        .ignore_boundary
        .map(PipOptions::ignore_boundary)
        .unwrap_or_else(|| state.service.options());
    let point = Coord {
        x: params.point_lon,
        y: params.point_lat,
    };

    let features = state
        .service
        .containing_with(point, options)
        .into_iter()
        .map(|m| LookupResult {
            index: m.position,
            classification: m.classification,
            properties: m.feature.properties.clone(),
        })
        .collect();

    Ok(Json(LookupResponse {
        features,
        took_us: start.elapsed().as_micros(),
    }))
}

#[derive(Deserialize)]
struct LookupQueryParams {
    /// Point longitude
    #[serde(rename = "point.lon")]
    point_lon: f64,
    /// Point latitude
    #[serde(rename = "point.lat")]
    point_lat: f64,
    /// Overrides the server default
    ignore_boundary: Option<bool>,
}

#[derive(Serialize)]
struct LookupResponse {
    features: Vec<LookupResult>,
    took_us: u128,
}

#[derive(Serialize)]
struct LookupResult {
    /// Position in the served collection
    index: usize,
    classification: Classification,
    properties: JsonObject,
}
