use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::fetch_error::FetchError;
use crate::models::IRRADIANCE_PARAMETER;

pub const DEFAULT_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/monthly/point";

/// Renewable-energy community profile on NASA POWER
const COMMUNITY: &str = "RE";

/// HTTP client for the NASA POWER monthly point API
#[derive(Clone)]
pub struct PowerClient {
    client: reqwest::Client,
    url: String,
    max_retries: usize,
}

impl PowerClient {
    pub fn new(url: String, timeout: Duration, max_retries: usize) -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url,
            max_retries,
        })
    }

    /// Fetch the raw monthly irradiance payload for one calendar year.
    ///
    /// Transient failures are retried with exponential backoff up to `max_retries`
    /// times (zero by default, so a failure surfaces immediately).
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_monthly(
        &self,
        latitude: f64,
        longitude: f64,
        year: i32,
    ) -> Result<Value, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.max_retries)
            .with_jitter();

        (|| self.request_monthly(latitude, longitude, year))
            .retry(backoff)
            .when(FetchError::is_transient)
            .notify(|e: &FetchError, delay: Duration| {
                warn!("Provider request failed ({}), retrying in {:?}", e, delay);
            })
            .await
    }

    async fn request_monthly(
        &self,
        latitude: f64,
        longitude: f64,
        year: i32,
    ) -> Result<Value, FetchError> {
        debug!("Sending HTTP request to irradiance provider");
        let response = self
            .client
            .get(&self.url)
            .query(&query_params(latitude, longitude, year))
            .send()
            .await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        let body = response.text().await?;
        debug!("Retrieved response body, size: {} bytes", body.len());

        if !status.is_success() {
            error!("Irradiance provider returned non-success status {}", status);
            debug!(
                "Response preview (first 500 chars): {}",
                body.chars().take(500).collect::<String>()
            );
            return Err(FetchError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Provider response is not valid JSON: {}", e);
            FetchError::Format(e)
        })
    }
}

fn query_params(latitude: f64, longitude: f64, year: i32) -> Vec<(&'static str, String)> {
    vec![
        ("parameters", IRRADIANCE_PARAMETER.to_string()),
        ("community", COMMUNITY.to_string()),
        ("longitude", longitude.to_string()),
        ("latitude", latitude.to_string()),
        ("start", year.to_string()),
        ("end", year.to_string()),
        ("format", "JSON".to_string()),
    ]
}
