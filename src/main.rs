mod cache;
mod clock;
mod config;
mod error;
mod extractors;
mod routes;
mod weather;

use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::create_weather_cache;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::weather::{OpenMeteoClient, WeatherService};

/// Shared HTTP client configuration. `HTTP_TIMEOUT_SECS` also bounds each
/// upstream call made by the weather service.
pub const HTTP_TIMEOUT_SECS: u64 = 15;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Clone)]
pub struct AppState {
    pub weather_service: Arc<WeatherService>,
}

/// Create shared HTTP client with connection pooling
fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clima=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        default_city = %config.default_city.name,
        cache_ttl_secs = config.cache_ttl_secs,
        hourly_limit = config.hourly_limit,
        "Configuration loaded successfully"
    );

    let http_client = create_http_client()?;
    let provider = Arc::new(OpenMeteoClient::new(
        http_client,
        &config.geocoding_api_url,
        &config.forecast_api_url,
    ));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = create_weather_cache(config.cache_ttl_secs, Arc::clone(&clock));

    let weather_service = Arc::new(WeatherService::new(
        provider,
        cache,
        clock,
        config.default_city.location(),
        config.hourly_limit,
        Duration::from_secs(HTTP_TIMEOUT_SECS),
    ));

    let app = routes::build_router(AppState { weather_service });

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
