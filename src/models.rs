use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DATA_SOURCE: &str = "NASA POWER API";
pub const IRRADIANCE_PARAMETER: &str = "ALLSKY_SFC_SW_DWN";
pub const IRRADIANCE_UNIT: &str = "kWh/m²/day";

/// Requesting coordinates, echoed back rather than the provider's grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One calendar month of average daily irradiance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIrradiance {
    pub month: String,
    /// Zero-based (January = 0)
    pub month_index: u32,
    pub irradiance: f64,
}

/// Canonical irradiance result for a coordinate.
///
/// `average_daily_irradiance` is the unweighted mean over exactly the entries in
/// `monthly_data`, and is 0 when the provider returned no usable months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSolarData {
    pub average_daily_irradiance: f64,
    pub monthly_data: Vec<MonthlyIrradiance>,
    pub location: Location,
    pub year: i32,
    pub data_source: String,
    pub parameter: String,
    pub unit: String,
    pub note: String,
}

// API response DTOs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolarDataResponse {
    pub success: bool,
    pub data: NormalizedSolarData,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
