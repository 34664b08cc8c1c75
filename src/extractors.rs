use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::convert::Infallible;

/// Query parameters for the weather API
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// City name from query string
    pub city: Option<String>,
}

/// Extracts city from either path parameter or query parameter
///
/// Checks path first, then falls back to query parameter.
/// Empty values count as missing.
#[derive(Debug)]
pub struct CityParam(pub Option<String>);

impl CityParam {
    /// Get the city value or use a default
    pub fn or_default(self, default: impl Into<String>) -> String {
        self.0.unwrap_or_else(|| default.into())
    }
}

impl<S> FromRequestParts<S> for CityParam
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Path(city)) = Path::<String>::from_request_parts(parts, state).await {
            if !city.is_empty() {
                return Ok(CityParam(Some(city)));
            }
        }

        if let Ok(Query(query)) = Query::<WeatherQuery>::from_request_parts(parts, state).await {
            return Ok(CityParam(query.city.filter(|c| !c.is_empty())));
        }

        // No city provided - handler uses the default
        Ok(CityParam(None))
    }
}
