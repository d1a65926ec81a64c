//! Dashboard API route handlers.
//!
//! All endpoints return JSON except the radar proxy, which redirects to the
//! tile host. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::cache::{CacheStats, KindStats};
use crate::dev::{DevConfig, DevConfigPatch};
use crate::geocode::{Geocoder, Place};
use crate::location::validate_coordinates;
use crate::radar::{self, RadarLayer};
use crate::scenarios::ScenarioSummary;
use crate::service::WeatherService;
use crate::storage::{LocationStore, SavedLocations};
use crate::types::{CurrentWeather, DailyForecast, HourlyForecast, Location, WeatherError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub service: WeatherService,
    /// Absent when no API key is configured.
    pub geocoder: Option<Geocoder>,
    pub locations: LocationStore,
    pub tile_key: Option<Secret<String>>,
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Weather(WeatherError),
    /// A feature that needs the provider key while none is configured.
    Unavailable(&'static str),
    Internal(anyhow::Error),
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        ApiError::Weather(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Weather(WeatherError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Weather(WeatherError::NoCachedData { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Weather(WeatherError::UnknownScenario(_)) => StatusCode::NOT_FOUND,
            ApiError::Weather(WeatherError::Provider(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Weather(e) => e.to_string(),
            ApiError::Unavailable(what) => format!("{what} is not configured"),
            ApiError::Internal(e) => {
                error!(error = %e, "Request failed");
                format!("{e:#}")
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CoordQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl CoordQuery {
    fn location(&self) -> Location {
        Location::new(self.lat, self.lng, self.name.clone().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub struct HourlyQuery {
    pub lat: f64,
    pub lng: f64,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: String,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub forecast: CacheStats,
    pub geocode_search: Option<KindStats>,
    pub geocode_reverse: Option<KindStats>,
    pub provider_calls: u64,
    pub cache_hits: u64,
    pub hit_rate: f64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            mode: state.service.dev_config().mode.to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// GET /api/weather/current
pub async fn get_current(
    State(state): State<AppState>,
    Query(q): Query<CoordQuery>,
) -> ApiResult<CurrentWeather> {
    let current = state.service.get_current_weather(&q.location()).await?;
    Ok(Json(current))
}

/// GET /api/weather/hourly
pub async fn get_hourly(
    State(state): State<AppState>,
    Query(q): Query<HourlyQuery>,
) -> ApiResult<Vec<HourlyForecast>> {
    let location = Location::new(q.lat, q.lng, "");
    let hours = state
        .service
        .get_hourly_forecast_for_day(&location, &q.date)
        .await?;
    Ok(Json(hours))
}

/// GET /api/weather/daily
pub async fn get_daily(
    State(state): State<AppState>,
    Query(q): Query<CoordQuery>,
) -> ApiResult<Vec<DailyForecast>> {
    let days = state.service.get_daily_forecast(&q.location()).await?;
    Ok(Json(days))
}

/// GET /api/geocode?q=
pub async fn geocode_search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Vec<Place>> {
    let geocoder = state.geocoder.as_ref().ok_or(ApiError::Unavailable("geocoding"))?;
    Ok(Json(geocoder.search(&q.q).await?))
}

/// GET /api/geocode/reverse
pub async fn geocode_reverse(
    State(state): State<AppState>,
    Query(q): Query<ReverseQuery>,
) -> ApiResult<Vec<Place>> {
    let geocoder = state.geocoder.as_ref().ok_or(ApiError::Unavailable("geocoding"))?;
    Ok(Json(geocoder.reverse(q.lat, q.lng).await?))
}

/// GET /api/radar/:layer/:z/:x/:y
pub async fn radar_tile(
    State(state): State<AppState>,
    Path((layer, z, x, y)): Path<(String, u8, u32, u32)>,
) -> Result<Redirect, ApiError> {
    let key = state.tile_key.as_ref().ok_or(ApiError::Unavailable("radar"))?;
    let layer: RadarLayer = layer.parse()?;
    let url = radar::tile_url(layer, z, x, y, key.expose_secret())?;
    Ok(Redirect::temporary(&url))
}

/// GET /api/dev
pub async fn get_dev(State(state): State<AppState>) -> Json<DevConfig> {
    Json(state.service.dev_config())
}

/// POST /api/dev
pub async fn set_dev(
    State(state): State<AppState>,
    Json(patch): Json<DevConfigPatch>,
) -> ApiResult<DevConfig> {
    Ok(Json(state.service.set_dev_mode(patch)?))
}

/// GET /api/dev/scenarios
pub async fn get_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioSummary>> {
    Json(state.service.available_scenarios())
}

/// GET /api/cache/stats
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let (search, reverse) = match &state.geocoder {
        Some(g) => {
            let (s, r) = g.stats();
            (Some(s), Some(r))
        }
        None => (None, None),
    };
    Json(CacheStatsResponse {
        forecast: state.service.cache_stats(),
        geocode_search: search,
        geocode_reverse: reverse,
        provider_calls: state.service.provider_calls(),
        cache_hits: state.service.cache_hits(),
        hit_rate: state.service.cache_hit_rate(),
    })
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.service.clear_cache();
    if let Some(g) = &state.geocoder {
        g.clear();
    }
    StatusCode::NO_CONTENT
}

/// GET /api/locations
pub async fn get_locations(State(state): State<AppState>) -> Json<SavedLocations> {
    Json(state.locations.snapshot())
}

/// POST /api/locations/current
pub async fn set_current_location(
    State(state): State<AppState>,
    Json(location): Json<Location>,
) -> ApiResult<SavedLocations> {
    validate_coordinates(location.lat, location.lng)?;
    info!(location = %location, "Current location changed");
    state.locations.set_current_location(location)?;
    Ok(Json(state.locations.snapshot()))
}
