mod client;
mod codes;
pub mod handlers;
mod models;
mod render;
mod service;
mod transform;

pub use client::OpenMeteoClient;
#[cfg(test)]
pub use client::WeatherProvider;
#[cfg(test)]
pub use models::RawForecast;
pub use models::{Location, ViewModel, DEFAULT_TIMEZONE};
pub use service::WeatherService;
