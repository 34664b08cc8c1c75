use thiserror::Error;

/// Failures while talking to Open-Meteo or reading its responses
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Failed to fetch data: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Upstream call timed out after {0}s")]
    Timeout(u64),
}

impl WeatherError {
    /// Short machine-readable tag used in log fields
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestError(_) => "REQUEST_ERROR",
            Self::ApiError(_) => "API_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}
