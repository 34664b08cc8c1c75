use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use super::codes::{description_for, icon_for, FALLBACK_DESCRIPTION, FALLBACK_ICON};
use super::models::*;
use crate::error::WeatherError;

/// Days in the weekly block
pub const WEEK_DAYS: usize = 7;

const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";

const TODAY_LABEL: &str = "Hoje";
/// Abbreviated pt-BR weekday names, Monday first
const WEEKDAY_LABELS: [&str; 7] = ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"];

/// Local hours (inclusive) drawn with day icons in the hourly strip
const DAYTIME_HOURS: std::ops::RangeInclusive<u32> = 6..=20;

const ERROR_LABEL: &str = "Erro";
const ERROR_ICON: &str = "error";
const ERROR_CONDITION: &str = "Não foi possível carregar os dados do tempo";

/// Turns a raw Open-Meteo forecast into the page view model
#[derive(Debug, Clone)]
pub struct ForecastTransformer {
    hourly_limit: usize,
    fallback_timezone: Tz,
}

impl ForecastTransformer {
    pub fn new(hourly_limit: usize, fallback_timezone: &str) -> Self {
        let fallback_timezone = fallback_timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %fallback_timezone, "Unknown fallback timezone, using UTC");
            Tz::UTC
        });
        Self {
            hourly_limit,
            fallback_timezone,
        }
    }

    fn resolve_timezone(&self, timezone: &str) -> Tz {
        timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %timezone, fallback = %self.fallback_timezone, "Unknown timezone");
            self.fallback_timezone
        })
    }

    /// Build the view model. `now` drives `last_updated` and which hours count as upcoming.
    pub fn transform(
        &self,
        raw: &RawForecast,
        city_name: &str,
        timezone: &str,
        now: DateTime<Utc>,
    ) -> Result<ViewModel, WeatherError> {
        let tz = self.resolve_timezone(timezone);
        let local_now = now.with_timezone(&tz);

        let current = current_view(&raw.current);
        let hourly_forecast = self.hourly_view(&raw.hourly, local_now.naive_local());
        let weekly_forecast = weekly_view(&raw.daily)?;
        let bottom_widgets = bottom_widgets(&current, &weekly_forecast[0]);

        Ok(ViewModel {
            city_data: CityData {
                city: title_case(city_name),
                last_updated: local_now.format("%H:%M").to_string(),
            },
            current,
            hourly_forecast,
            weekly_forecast,
            bottom_widgets,
        })
    }

    fn hourly_view(&self, hourly: &RawHourly, local_now: NaiveDateTime) -> Vec<HourlyView> {
        hourly
            .time
            .iter()
            .zip(&hourly.temperature_2m)
            .zip(&hourly.weather_code)
            .filter_map(|((time, temp), code)| {
                let at = NaiveDateTime::parse_from_str(time, HOURLY_TIME_FORMAT)
                    .map_err(|e| tracing::debug!(time = %time, error = %e, "Skipping hourly entry"))
                    .ok()?;
                Some((at, (*temp)?, (*code)?))
            })
            .filter(|(at, _, _)| *at >= local_now)
            .take(self.hourly_limit)
            .map(|(at, temp, code)| {
                let is_day = DAYTIME_HOURS.contains(&at.hour());
                HourlyView {
                    time: at.format("%H:%M").to_string(),
                    icon: icon_for(code, is_day).to_string(),
                    temp: round(temp),
                    condition: description_for(code).to_string(),
                }
            })
            .collect()
    }
}

fn current_view(current: &RawCurrent) -> CurrentView {
    CurrentView {
        temp: Reading::Value(round(current.temperature_2m)),
        icon: icon_for(current.weather_code, current.is_day == 1).to_string(),
        condition: description_for(current.weather_code).to_string(),
        wind_speed: round(current.wind_speed_10m),
        humidity: round(current.relative_humidity_2m),
        pressure: round(current.pressure_msl),
        wind_direction: round(current.wind_direction_10m),
    }
}

fn weekly_view(daily: &RawDaily) -> Result<Vec<DailyView>, WeatherError> {
    if daily.time.len() < WEEK_DAYS {
        return Err(WeatherError::InvalidResponse(format!(
            "expected {} daily entries, got {}",
            WEEK_DAYS,
            daily.time.len()
        )));
    }

    (0..WEEK_DAYS)
        .map(|i| -> Result<DailyView, WeatherError> {
            let date = NaiveDate::parse_from_str(&daily.time[i], DAILY_DATE_FORMAT)
                .map_err(|e| WeatherError::InvalidResponse(format!("daily time: {}", e)))?;
            let max_temp = value_at(&daily.temperature_2m_max, i)
                .ok_or_else(|| WeatherError::InvalidResponse(format!("missing max temp for day {}", i)))?;
            let min_temp = value_at(&daily.temperature_2m_min, i)
                .ok_or_else(|| WeatherError::InvalidResponse(format!("missing min temp for day {}", i)))?;
            let code = value_at(&daily.weather_code, i);

            Ok(DailyView {
                day: day_label(i, date),
                icon: code.map_or(FALLBACK_ICON, |c| icon_for(c, true)).to_string(),
                max_temp: round(max_temp),
                min_temp: round(min_temp),
                uv_index_max: round(value_at(&daily.uv_index_max, i).unwrap_or(0.0)),
                precipitation_probability: round(
                    value_at(&daily.precipitation_probability_max, i).unwrap_or(0.0),
                ),
                condition: code.map_or(FALLBACK_DESCRIPTION, description_for).to_string(),
            })
        })
        .collect()
}

fn bottom_widgets(current: &CurrentView, today: &DailyView) -> Vec<Widget> {
    vec![
        Widget::new("Vento", "wind", format!("{} km/h", current.wind_speed)),
        Widget::new("Umidade", "droplet", format!("{}%", current.humidity)),
        Widget::new("Pressão", "gauge", format!("{} hPa", current.pressure)),
        Widget::new("Índice UV", "sun", today.uv_index_max.to_string()),
        Widget::new(
            "Chuva",
            "umbrella",
            format!("{}%", today.precipitation_probability),
        ),
        Widget::new(
            "Direção do vento",
            "compass",
            format!("{}°", current.wind_direction),
        ),
    ]
}

/// View model shown when no forecast could be fetched at all
pub fn error_view_model(city_name: &str) -> ViewModel {
    ViewModel {
        city_data: CityData {
            city: title_case(city_name),
            last_updated: NOT_AVAILABLE.to_string(),
        },
        current: CurrentView {
            temp: Reading::NotAvailable,
            icon: ERROR_ICON.to_string(),
            condition: ERROR_CONDITION.to_string(),
            wind_speed: 0,
            humidity: 0,
            pressure: 0,
            wind_direction: 0,
        },
        hourly_forecast: Vec::new(),
        weekly_forecast: Vec::new(),
        bottom_widgets: (0..6)
            .map(|_| Widget::new(ERROR_LABEL, ERROR_ICON, NOT_AVAILABLE.to_string()))
            .collect(),
    }
}

fn day_label(index: usize, date: NaiveDate) -> String {
    if index == 0 {
        TODAY_LABEL.to_string()
    } else {
        WEEKDAY_LABELS[date.weekday().num_days_from_monday() as usize].to_string()
    }
}

fn value_at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

/// Round half to even, matching how the upstream values were displayed before
fn round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Upper-case each letter that follows a non-letter, lower-case the rest
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_letter = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
