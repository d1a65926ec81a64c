//! Dashboard: Axum web server for the weather frontend.
//!
//! Serves the forecast, geocoding, radar, dev-harness and saved-location
//! endpoints as a JSON API. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{ApiError, AppState, DashboardState};

/// Bind `port` and serve until `shutdown` resolves.
pub async fn serve<F>(state: AppState, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server error")?;
    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Forecasts
        .route("/api/weather/current", get(routes::get_current))
        .route("/api/weather/hourly", get(routes::get_hourly))
        .route("/api/weather/daily", get(routes::get_daily))
        // Places and map
        .route("/api/geocode", get(routes::geocode_search))
        .route("/api/geocode/reverse", get(routes::geocode_reverse))
        .route("/api/radar/:layer/:z/:x/:y", get(routes::radar_tile))
        // Dev harness and cache
        .route("/api/dev", get(routes::get_dev).post(routes::set_dev))
        .route("/api/dev/scenarios", get(routes::get_scenarios))
        .route("/api/cache/stats", get(routes::get_cache_stats))
        .route("/api/cache/clear", post(routes::clear_cache))
        // Saved locations
        .route("/api/locations", get(routes::get_locations))
        .route("/api/locations/current", post(routes::set_current_location))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
