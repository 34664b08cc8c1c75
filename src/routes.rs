use axum::{
    error_handling::HandleErrorLayer, http::StatusCode, routing::get, BoxError, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::weather::handlers as weather_handlers;
use crate::{AppState, HTTP_TIMEOUT_SECS};

/// Most sequential upstream calls one page needs: geocode, forecast, default-city retry
const MAX_UPSTREAM_CALLS: u64 = 3;

/// Upper bound for a whole request. Always longer than the worst upstream
/// chain, so a hung upstream ends in the error page rather than a 408.
const REQUEST_TIMEOUT_SECS: u64 = MAX_UPSTREAM_CALLS * HTTP_TIMEOUT_SECS + 15;

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Build the page routes
fn page_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(weather_handlers::index).post(weather_handlers::search),
    )
}

/// Build all API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather_handlers::get_weather))
        .route("/weather/{city}", get(weather_handlers::get_weather))
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(page_routes())
        .route("/health", get(weather_handlers::health))
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_weather_cache;
    use crate::clock::SystemClock;
    use crate::error::WeatherError;
    use crate::weather::{Location, OpenMeteoClient, RawForecast, WeatherProvider, WeatherService};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body() -> serde_json::Value {
        let hours: Vec<String> = (0..24).map(|h| format!("2099-01-01T{:02}:00", h)).collect();
        let days: Vec<String> = (1..=7).map(|d| format!("2099-01-{:02}", d)).collect();
        serde_json::json!({
            "current": {
                "temperature_2m": 27.3,
                "relative_humidity_2m": 60,
                "is_day": 1,
                "weather_code": 0,
                "wind_speed_10m": 12.2,
                "wind_direction_10m": 90,
                "pressure_msl": 1012.4
            },
            "hourly": {
                "time": hours,
                "temperature_2m": vec![20.0; 24],
                "weather_code": vec![3; 24]
            },
            "daily": {
                "time": days,
                "weather_code": vec![3; 7],
                "temperature_2m_max": vec![30.0; 7],
                "temperature_2m_min": vec![19.0; 7],
                "uv_index_max": vec![8.0; 7],
                "precipitation_probability_max": vec![10; 7]
            }
        })
    }

    fn app_with(provider: Arc<dyn WeatherProvider>) -> Router {
        let clock = Arc::new(SystemClock);
        let default_location = Location {
            latitude: -23.55,
            longitude: -46.63,
            timezone: "America/Sao_Paulo".to_string(),
            name: "São Paulo".to_string(),
        };
        let service = WeatherService::new(
            provider,
            create_weather_cache(300, clock.clone()),
            clock,
            default_location,
            8,
            Duration::from_secs(HTTP_TIMEOUT_SECS),
        );
        build_router(AppState {
            weather_service: Arc::new(service),
        })
    }

    fn app(server: &MockServer) -> Router {
        app_with(Arc::new(OpenMeteoClient::new(
            reqwest::Client::new(),
            &format!("{}/v1/search", server.uri()),
            &format!("{}/v1/forecast", server.uri()),
        )))
    }

    /// Upstream that answers only after the given delays
    struct HungProvider {
        geocode_delay: Duration,
        forecast_delay: Duration,
    }

    #[async_trait]
    impl WeatherProvider for HungProvider {
        async fn geocode(&self, _city_name: &str) -> Option<Location> {
            tokio::time::sleep(self.geocode_delay).await;
            None
        }

        async fn fetch_forecast(&self, _location: &Location) -> Result<RawForecast, WeatherError> {
            tokio::time::sleep(self.forecast_delay).await;
            Err(WeatherError::ApiError("HTTP 504 Gateway Timeout".to_string()))
        }
    }

    async fn mount_recife(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "recife"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"latitude": -8.05, "longitude": -34.9, "timezone": "America/Recife", "name": "Recife"}]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(server)
            .await;
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let response = app(&server)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_post_city_renders_page() {
        let server = MockServer::start().await;
        mount_recife(&server).await;

        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("city_name=recife"))
            .unwrap();
        let response = app(&server).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<h1 class=\"city\">Recife</h1>"));
        assert!(html.contains("27°C"));
        assert!(html.contains("const CHART_TEMPS = [20,20,20,20,20,20,20,20];"));
        assert_eq!(html.matches("class=\"widget\"").count(), 6);
    }

    #[tokio::test]
    async fn test_get_uses_default_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "São Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"latitude": -23.5475, "longitude": -46.63611, "timezone": "America/Sao_Paulo", "name": "São Paulo"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("São Paulo"));
    }

    #[tokio::test]
    async fn test_post_without_field_uses_default_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "São Paulo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("city_name="))
            .unwrap();
        let response = app(&server).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upstream_outage_renders_error_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("city_name=zzqx123"))
            .unwrap();
        let response = app(&server).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("icon-error"));
        assert!(html.contains("Zzqx123"));
    }

    #[tokio::test]
    async fn test_api_weather_by_path() {
        let server = MockServer::start().await;
        mount_recife(&server).await;

        let response = app(&server)
            .oneshot(Request::get("/api/v1/weather/recife").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["city_data"]["city"], "Recife");
        assert_eq!(json["current"]["temp"], 27);
        assert_eq!(json["weekly_forecast"].as_array().unwrap().len(), 7);
        assert_eq!(json["weekly_forecast"][0]["day"], "Hoje");
        assert_eq!(json["bottom_widgets"].as_array().unwrap().len(), 6);
        assert_eq!(json["chart_times"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_api_weather_by_query() {
        let server = MockServer::start().await;
        mount_recife(&server).await;

        let response = app(&server)
            .oneshot(Request::get("/api/v1/weather?city=recife").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["city_data"]["city"], "Recife");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_upstream_renders_error_page() {
        let app = app_with(Arc::new(HungProvider {
            geocode_delay: Duration::from_secs(30),
            forecast_delay: Duration::from_secs(31),
        }));

        let started = tokio::time::Instant::now();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(started.elapsed() < Duration::from_secs(REQUEST_TIMEOUT_SECS));
        let html = body_string(response).await;
        assert!(html.contains("icon-error"));
        assert!(html.contains("São Paulo"));
    }
}
