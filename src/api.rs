use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi};

use crate::models::{
    ErrorResponse, HealthResponse, Location, MonthlyIrradiance, NormalizedSolarData,
    SolarDataResponse,
};
use crate::services::SolarDataSource;

#[derive(Clone)]
pub struct AppState {
    pub solar_data: Arc<dyn SolarDataSource>,
}

/// Raw coordinate query; validated in [`parse_coordinates`]
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SolarQuery {
    /// Latitude in decimal degrees, -90 to 90
    pub lat: Option<String>,
    /// Longitude in decimal degrees, -180 to 180
    pub lon: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required query parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("{0}")]
    InvalidCoordinate(String),
    #[error("Failed to fetch solar data. Please try again later.")]
    UpstreamUnavailable,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingParameter(_) => "MissingParameter",
            ApiError::InvalidCoordinate(_) => "InvalidCoordinate",
            ApiError::UpstreamUnavailable => "UpstreamUnavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) | ApiError::InvalidCoordinate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, get_solar_data),
    components(schemas(
        HealthResponse,
        SolarDataResponse,
        NormalizedSolarData,
        MonthlyIrradiance,
        Location,
        ErrorResponse
    )),
    tags((name = "solar", description = "Solar irradiance lookup"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/solar", get(get_solar_data))
        .route("/openapi.json", get(openapi_json))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

/// Validate `lat`/`lon` query strings into decimal degrees
pub fn parse_coordinates(query: &SolarQuery) -> Result<(f64, f64), ApiError> {
    let lat = required(&query.lat, "lat")?;
    let lon = required(&query.lon, "lon")?;

    let latitude = parse_degrees(lat, "latitude")?;
    let longitude = parse_degrees(lon, "longitude")?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::InvalidCoordinate(format!(
            "Latitude must be between -90 and 90, got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::InvalidCoordinate(format!(
            "Longitude must be between -180 and 180, got {longitude}"
        )));
    }

    Ok((latitude, longitude))
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingParameter(name)),
    }
}

fn parse_degrees(value: &str, name: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::InvalidCoordinate(format!("Invalid {name} '{value}'")))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "solar",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Solar potential service is running".to_string(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/solar",
    tag = "solar",
    params(SolarQuery),
    responses(
        (status = 200, description = "Monthly and average irradiance", body = SolarDataResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Irradiance provider unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_solar_data(
    State(state): State<AppState>,
    query: Result<Query<SolarQuery>, QueryRejection>,
) -> Result<Json<SolarDataResponse>, ApiError> {
    // Malformed query strings (e.g. a repeated `lat`) still get the JSON error body
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected solar query string: {}", rejection.body_text());
        ApiError::InvalidCoordinate(format!("Invalid query string: {}", rejection.body_text()))
    })?;

    let (latitude, longitude) = parse_coordinates(&query).map_err(|e| {
        warn!("Rejected solar request: {}", e);
        e
    })?;

    debug!("Fetching solar data for ({}, {})", latitude, longitude);
    let data = state
        .solar_data
        .get_solar_data(latitude, longitude)
        .await
        .map_err(|e| {
            error!(
                "Failed to fetch solar data for ({}, {}): {}",
                latitude, longitude, e
            );
            ApiError::UpstreamUnavailable
        })?;

    info!(
        "Returning {} months for ({}, {}), average {:.2}",
        data.monthly_data.len(),
        latitude,
        longitude,
        data.average_daily_irradiance
    );

    Ok(Json(SolarDataResponse {
        success: true,
        data,
        location: Location {
            latitude,
            longitude,
        },
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(generate_openapi_spec())
}
