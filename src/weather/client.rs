use async_trait::async_trait;
use reqwest::Client;

use super::models::*;
use crate::error::WeatherError;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,is_day,weather_code,wind_speed_10m,wind_direction_10m,pressure_msl";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,uv_index_max,precipitation_probability_max";
const FORECAST_DAYS: &str = "7";

/// Source of geocoding and forecast data
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a free-text city name. Any failure reads as "not found".
    async fn geocode(&self, city_name: &str) -> Option<Location>;

    /// Fetch current, hourly and daily readings for a location
    async fn fetch_forecast(&self, location: &Location) -> Result<RawForecast, WeatherError>;
}

/// Open-Meteo geocoding and forecast client
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: Client, geocoding_url: &str, forecast_url: &str) -> Self {
        Self {
            client,
            geocoding_url: geocoding_url.to_string(),
            forecast_url: forecast_url.to_string(),
        }
    }

    async fn search(&self, city_name: &str) -> Result<Option<Location>, WeatherError> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", city_name),
                ("count", "1"),
                ("language", "pt"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::ApiError(format!("HTTP {}", status)));
        }

        let data: GeocodingResponse = response.json().await?;
        Ok(data
            .results
            .and_then(|results| results.into_iter().next())
            .map(Location::from))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn geocode(&self, city_name: &str) -> Option<Location> {
        tracing::debug!(city = %city_name, "Geocoding city");

        match self.search(city_name).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                tracing::info!(city = %city_name, "No geocoding results");
                None
            }
            Err(e) => {
                tracing::warn!(city = %city_name, error = %e, "Geocoding failed");
                None
            }
        }
    }

    async fn fetch_forecast(&self, location: &Location) -> Result<RawForecast, WeatherError> {
        tracing::debug!(
            city = %location.name,
            lat = %location.latitude,
            lon = %location.longitude,
            "Fetching forecast"
        );

        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("timezone", location.timezone.as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("forecast_days", FORECAST_DAYS),
                ("models", "best_match"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received forecast response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WeatherError::ApiError(format!("HTTP {}: {}", status, text)));
        }

        Ok(response.json().await?)
    }
}
