use std::sync::Arc;
use std::time::Duration;

use super::client::WeatherProvider;
use super::models::{Location, ViewModel};
use super::transform::{error_view_model, ForecastTransformer};
use crate::cache::WeatherCache;
use crate::clock::Clock;
use crate::error::WeatherError;

/// Resolves a city to its rendered weather, going through the cache first
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: WeatherCache,
    clock: Arc<dyn Clock>,
    transformer: ForecastTransformer,
    default_location: Location,
    upstream_timeout: Duration,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: WeatherCache,
        clock: Arc<dyn Clock>,
        default_location: Location,
        hourly_limit: usize,
        upstream_timeout: Duration,
    ) -> Self {
        let transformer = ForecastTransformer::new(hourly_limit, &default_location.timezone);
        Self {
            provider,
            cache,
            clock,
            transformer,
            default_location,
            upstream_timeout,
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_location.name
    }

    /// Weather for `city_name`. Falls back to the default city when the name
    /// can't be resolved or its forecast fails, and to an error view when the
    /// default city fails too. Only successful results are cached.
    pub async fn get_weather(&self, city_name: &str) -> ViewModel {
        let cache_key = city_name.to_string();
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(city = %city_name, "Weather cache hit");
            return cached;
        }
        tracing::debug!(city = %city_name, "Weather cache miss");

        let (mut location, mut used_default) = match self.geocode(city_name).await {
            Some(location) => (location, false),
            None => {
                tracing::info!(
                    city = %city_name,
                    fallback = %self.default_location.name,
                    "City not found, using default city"
                );
                (self.default_location.clone(), true)
            }
        };

        loop {
            match self.fetch_view(&location).await {
                Ok(view) => {
                    self.cache.insert(cache_key, view.clone());
                    tracing::info!(
                        city = %city_name,
                        resolved = %location.name,
                        temp = %view.current.temp,
                        cached_cities = self.cache.len(),
                        "Weather data fetched successfully"
                    );
                    return view;
                }
                Err(e) if used_default => {
                    tracing::error!(
                        city = %city_name,
                        error = %e,
                        code = e.code(),
                        "Weather unavailable for default city, rendering error page"
                    );
                    return error_view_model(city_name);
                }
                Err(e) => {
                    tracing::warn!(
                        city = %city_name,
                        error = %e,
                        code = e.code(),
                        "Forecast failed, retrying with default city"
                    );
                    location = self.default_location.clone();
                    used_default = true;
                }
            }
        }
    }

    /// A geocode that outlives the upstream timeout reads as not found
    async fn geocode(&self, city_name: &str) -> Option<Location> {
        match tokio::time::timeout(self.upstream_timeout, self.provider.geocode(city_name)).await {
            Ok(location) => location,
            Err(_) => {
                tracing::warn!(
                    city = %city_name,
                    timeout_secs = self.upstream_timeout.as_secs(),
                    "Geocoding timed out"
                );
                None
            }
        }
    }

    async fn fetch_view(&self, location: &Location) -> Result<ViewModel, WeatherError> {
        let raw = tokio::time::timeout(self.upstream_timeout, self.provider.fetch_forecast(location))
            .await
            .map_err(|_| WeatherError::Timeout(self.upstream_timeout.as_secs()))??;
        self.transformer
            .transform(&raw, &location.name, &location.timezone, self.clock.now())
    }
}
