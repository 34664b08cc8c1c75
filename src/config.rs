use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::weather::{Location, DEFAULT_TIMEZONE};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// City shown when no city is submitted, and used when lookups fail
    #[serde(default)]
    pub default_city: DefaultCityConfig,

    /// How long a rendered city stays cached, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of upcoming hours shown
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: usize,

    /// Open-Meteo geocoding endpoint
    #[serde(default = "default_geocoding_api_url")]
    pub geocoding_api_url: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_api_url")]
    pub forecast_api_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultCityConfig {
    #[serde(default = "default_city_name")]
    pub name: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA timezone id
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for DefaultCityConfig {
    fn default() -> Self {
        Self {
            name: default_city_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl DefaultCityConfig {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.clone(),
            name: self.name.clone(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_city_name() -> String {
    "São Paulo".to_string()
}

fn default_latitude() -> f64 {
    -23.55
}

fn default_longitude() -> f64 {
    -46.63
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_hourly_limit() -> usize {
    8
}

fn default_geocoding_api_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_api_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("cache_ttl_secs", default_cache_ttl_secs())?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // CLIMA_DEFAULT_CITY__NAME -> default_city.name
            .add_source(
                Environment::with_prefix("CLIMA")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
