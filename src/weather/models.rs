use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Timezone used when the geocoder omits one
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Placeholder for readings that could not be fetched
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Geocoding API Response
// ============================================================================

/// A resolved place, ready to query the forecast for
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone id
    pub timezone: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub name: String,
}

impl From<GeocodingResult> for Location {
    fn from(r: GeocodingResult) -> Self {
        Location {
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            name: r.name,
        }
    }
}

// ============================================================================
// Forecast API Response (Internal)
// Open-Meteo returns parallel arrays; hourly and daily values can be null
// past the model horizon.
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawForecast {
    pub current: RawCurrent,
    pub hourly: RawHourly,
    pub daily: RawDaily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    /// 1 during daylight, 0 at night
    pub is_day: u8,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub pressure_msl: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHourly {
    /// Local times formatted `YYYY-MM-DDTHH:MM`
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDaily {
    /// Local dates formatted `YYYY-MM-DD`
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
}

// ============================================================================
// View model consumed by the page and the JSON API
// ============================================================================

/// A rounded reading, or a marker that it is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Value(i64),
    NotAvailable,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{}", v),
            Reading::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Value(v) => serializer.serialize_i64(*v),
            Reading::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub city_data: CityData,
    pub current: CurrentView,
    pub hourly_forecast: Vec<HourlyView>,
    pub weekly_forecast: Vec<DailyView>,
    pub bottom_widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityData {
    pub city: String,
    /// `HH:MM` in the city's timezone
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub temp: Reading,
    pub icon: String,
    pub condition: String,
    pub wind_speed: i64,
    pub humidity: i64,
    pub pressure: i64,
    pub wind_direction: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyView {
    pub time: String,
    pub icon: String,
    pub temp: i64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyView {
    pub day: String,
    pub icon: String,
    pub max_temp: i64,
    pub min_temp: i64,
    pub uv_index_max: i64,
    pub precipitation_probability: i64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub label: String,
    pub icon: String,
    pub value: String,
}

impl Widget {
    pub fn new(label: &str, icon: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            value,
        }
    }
}

/// Everything the page needs: the view model plus the chart series
#[derive(Debug, Clone, Serialize)]
pub struct WeatherPage {
    #[serde(flatten)]
    pub view: ViewModel,
    pub chart_temps: Vec<i64>,
    pub chart_times: Vec<String>,
}

impl From<ViewModel> for WeatherPage {
    fn from(view: ViewModel) -> Self {
        let chart_temps = view.hourly_forecast.iter().map(|h| h.temp).collect();
        let chart_times = view
            .hourly_forecast
            .iter()
            .map(|h| h.time.clone())
            .collect();
        Self {
            view,
            chart_temps,
            chart_times,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_serializes_as_number_or_marker() {
        assert_eq!(serde_json::to_value(Reading::Value(21)).unwrap(), 21);
        assert_eq!(serde_json::to_value(Reading::NotAvailable).unwrap(), "N/A");
        assert_eq!(Reading::Value(-3).to_string(), "-3");
    }

    #[test]
    fn test_geocoding_result_without_timezone_uses_default() {
        let json = r#"{"results":[{"latitude":-22.9,"longitude":-43.2,"name":"Rio de Janeiro"}]}"#;
        let response: GeocodingResponse = serde_json::from_str(json).unwrap();
        let location: Location = response.results.unwrap().remove(0).into();
        assert_eq!(location.timezone, DEFAULT_TIMEZONE);
        assert_eq!(location.name, "Rio de Janeiro");
    }

    #[test]
    fn test_geocoding_response_without_results() {
        let response: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(response.results.is_none());
    }

    #[test]
    fn test_raw_forecast_accepts_nulls() {
        let json = serde_json::json!({
            "current": {
                "time": "2024-06-01T12:00",
                "temperature_2m": 22.4,
                "relative_humidity_2m": 70,
                "is_day": 1,
                "weather_code": 2,
                "wind_speed_10m": 9.7,
                "wind_direction_10m": 140,
                "pressure_msl": 1016.2
            },
            "hourly": {
                "time": ["2024-06-01T12:00", "2024-06-01T13:00"],
                "temperature_2m": [22.4, null],
                "weather_code": [2, null]
            },
            "daily": {
                "time": ["2024-06-01"],
                "weather_code": [2],
                "temperature_2m_max": [25.0],
                "temperature_2m_min": [15.1],
                "uv_index_max": [null],
                "precipitation_probability_max": [null]
            }
        });

        let raw: RawForecast = serde_json::from_value(json).unwrap();
        assert_eq!(raw.current.is_day, 1);
        assert_eq!(raw.hourly.temperature_2m[1], None);
        assert_eq!(raw.daily.uv_index_max[0], None);
    }
}
