use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use futures::future::{BoxFuture, FutureExt};
use tracing::{info, instrument, warn};

use crate::cache::SolarCache;
use crate::fetch_error::FetchError;
use crate::fetcher::PowerClient;
use crate::models::NormalizedSolarData;
use crate::normalizer;

/// Source of normalized irradiance data, as consumed by the HTTP layer
pub trait SolarDataSource: Send + Sync {
    fn get_solar_data(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> BoxFuture<'_, Result<NormalizedSolarData, FetchError>>;
}

#[derive(Clone)]
pub struct SolarService {
    client: PowerClient,
    cache: Arc<dyn SolarCache>,
}

impl SolarService {
    pub fn new(client: PowerClient, cache: Arc<dyn SolarCache>) -> Self {
        Self { client, cache }
    }

    /// Get irradiance for a coordinate, serving from cache when possible.
    ///
    /// On a miss, the prior full calendar year is fetched from the provider,
    /// normalized, and cached. Concurrent misses for the same bucket each call the
    /// provider; there is no in-flight deduplication.
    #[instrument(skip(self))]
    pub async fn fetch_solar_data(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<NormalizedSolarData, FetchError> {
        if let Some(cached) = self.cache.get(latitude, longitude) {
            info!("Serving cached solar data for ({}, {})", latitude, longitude);
            return Ok(cached);
        }

        let year = previous_calendar_year(Utc::now());
        info!(
            "Fetching {} solar data from provider for ({}, {})",
            year, latitude, longitude
        );
        let payload = self.client.fetch_monthly(latitude, longitude, year).await?;

        let data = normalizer::normalize(&payload, latitude, longitude, year);
        if data.monthly_data.is_empty() {
            warn!(
                "Provider returned no usable months for ({}, {})",
                latitude, longitude
            );
        }

        if let Err(e) = self.cache.set(latitude, longitude, data.clone()) {
            warn!("Failed to cache solar data: {}", e);
        }

        info!(
            "Retrieved {} months, average {:.2} kWh/m²/day",
            data.monthly_data.len(),
            data.average_daily_irradiance
        );
        Ok(data)
    }
}

impl SolarDataSource for SolarService {
    fn get_solar_data(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> BoxFuture<'_, Result<NormalizedSolarData, FetchError>> {
        self.fetch_solar_data(latitude, longitude).boxed()
    }
}

/// Last complete calendar year, so the current year's partial data never biases
/// the average
pub fn previous_calendar_year(now: DateTime<Utc>) -> i32 {
    now.year() - 1
}
