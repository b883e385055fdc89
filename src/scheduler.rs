use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, info, instrument};

use crate::cache::SolarCache;

/// Periodically drop expired cache entries so unrequested buckets don't
/// accumulate between reads
#[instrument(skip(cache), fields(interval_secs = %interval_secs))]
pub async fn start_cache_sweeper(cache: Arc<dyn SolarCache>, interval_secs: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_secs));

    info!("Cache sweeper started with {} second interval", interval_secs);

    loop {
        interval.tick().await;
        let purged = cache.purge_expired();
        if purged > 0 {
            info!("Purged {} expired cache entries, {} remain", purged, cache.len());
        } else {
            debug!("Cache sweep found nothing to purge");
        }
    }
}
