use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::cache::{InMemorySolarCache, SolarCache, DEFAULT_TTL};
use crate::config::Config;
use crate::fetcher::PowerClient;
use crate::scheduler;
use crate::services::SolarService;

/// Running application: HTTP server plus the cache sweeper.
///
/// The cache is owned here rather than living in a global, so it is created at
/// startup and cleared when the server stops.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub sweeper_handle: JoinHandle<()>,
    cache: Arc<dyn SolarCache>,
    port: u16,
}

impl Application {
    /// Build and initialize the application, stopping on Ctrl-C or SIGTERM
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        Self::build_with_shutdown(config, shutdown_signal()).await
    }

    /// Build and initialize the application, stopping when `shutdown` resolves
    ///
    /// Binds the listener before returning, so `port()` is valid even when the
    /// configured port is 0.
    pub async fn build_with_shutdown<F>(
        config: Config,
        shutdown: F,
    ) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Initializing application components");

        let cache: Arc<dyn SolarCache> = Arc::new(InMemorySolarCache::new(
            DEFAULT_TTL,
            config.cache_max_entries,
        ));
        let client = PowerClient::new(
            config.power_url.clone(),
            config.request_timeout(),
            config.provider_max_retries,
        )?;
        let solar_service = SolarService::new(client, cache.clone());

        let sweeper_handle = {
            let cache = cache.clone();
            let interval = config.cache_sweep_interval_secs;
            tokio::spawn(async move {
                scheduler::start_cache_sweeper(cache, interval).await;
            })
        };

        let app_state = AppState {
            solar_data: Arc::new(solar_service),
        };
        let app = create_router(app_state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!("Starting HTTP server on {}", listener.local_addr()?);

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            sweeper_handle,
            cache,
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn cache(&self) -> Arc<dyn SolarCache> {
        self.cache.clone()
    }

    /// Wait for the server to stop, then tear down the sweeper and cache
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        let result = self.server_handle.await;

        self.sweeper_handle.abort();
        // Cancelled is the expected outcome here
        let _ = self.sweeper_handle.await;
        self.cache.clear();
        info!("Application stopped, cache cleared");

        result??;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
