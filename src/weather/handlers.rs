use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use super::models::WeatherPage;
use super::render::render_page;
use crate::extractors::CityParam;
use crate::AppState;

/// Search form posted from the page
#[derive(Debug, Deserialize)]
pub struct CityForm {
    pub city_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Page for the default city
///
/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let city = state.weather_service.default_city().to_string();
    render(&state, &city).await
}

/// Page for the submitted city, or the default one when the field is missing or empty
///
/// POST / (city_name=...)
pub async fn search(
    State(state): State<AppState>,
    form: Result<Form<CityForm>, FormRejection>,
) -> Html<String> {
    let submitted = match form {
        Ok(Form(form)) => form.city_name.filter(|c| !c.is_empty()),
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable search form, using default city");
            None
        }
    };
    let city = submitted.unwrap_or_else(|| state.weather_service.default_city().to_string());

    render(&state, &city).await
}

/// JSON form of the page payload
///
/// GET /api/v1/weather?city=Recife
/// GET /api/v1/weather/{city}
pub async fn get_weather(State(state): State<AppState>, city: CityParam) -> Json<WeatherPage> {
    let city = city.or_default(state.weather_service.default_city());
    let view = state.weather_service.get_weather(&city).await;
    Json(WeatherPage::from(view))
}

async fn render(state: &AppState, city: &str) -> Html<String> {
    let view = state.weather_service.get_weather(city).await;
    Html(render_page(&WeatherPage::from(view)))
}
