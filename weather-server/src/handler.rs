use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
    routing::get,
};
use serde::Serialize;
use tracing::error;
use weather_core::WeatherService;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new().route("/v1/weather/", get(current_weather)).with_state(service)
}

async fn current_weather(State(service): State<Arc<WeatherService>>) -> Response {
    match service.get_current_weather().await {
        Ok(reading) => write_response(StatusCode::OK, Some(&reading)),
        Err(err) => {
            error!(error = %err, "current weather unavailable");
            let body = ErrorBody { message: format!("A system error occurred. Details: {err}") };
            write_response(StatusCode::INTERNAL_SERVER_ERROR, Some(&body))
        }
    }
}

/// JSON response with the given status. The body is dropped for statuses that
/// forbid one; a body that fails to serialize turns the response into a bare 500.
pub fn write_response<T: Serialize>(status: StatusCode, data: Option<&T>) -> Response {
    let body = match data {
        Some(data) if body_allowed_for_status(status) => match serde_json::to_vec(data) {
            Ok(bytes) => Body::from(bytes),
            Err(err) => {
                error!(error = %err, "failed to serialize response body");
                return json_response(StatusCode::INTERNAL_SERVER_ERROR, Body::empty());
            }
        },
        _ => Body::empty(),
    };

    json_response(status, body)
}

fn json_response(status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn body_allowed_for_status(status: StatusCode) -> bool {
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use weather_core::{
        Config, ProviderConfig, ProviderKind, WeatherError, WeatherReading, WeatherSource,
    };

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable")
            .to_vec()
    }

    fn content_type(response: &Response) -> Option<&str> {
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn write_response_serializes_body() {
        let reading = WeatherReading { temperature_degrees: 20.0, wind_speed: 15.0 };
        let response = write_response(StatusCode::OK, Some(&reading));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), Some("application/json"));

        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, serde_json::json!({ "temperature_degrees": 20.0, "wind_speed": 15.0 }));
    }

    #[tokio::test]
    async fn write_response_without_data_has_empty_body() {
        let response = write_response::<()>(StatusCode::OK, None);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), Some("application/json"));
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn write_response_drops_body_when_status_forbids_it() {
        let data = ErrorBody { message: "ignored".into() };
        let response = write_response(StatusCode::NO_CONTENT, Some(&data));

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(content_type(&response), Some("application/json"));
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn write_response_unserializable_body_becomes_500() {
        let bad: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1], 1)]);
        let response = write_response(StatusCode::OK, Some(&bad));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type(&response), Some("application/json"));
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn body_rules_by_status() {
        assert!(!body_allowed_for_status(StatusCode::CONTINUE));
        assert!(!body_allowed_for_status(StatusCode::NO_CONTENT));
        assert!(!body_allowed_for_status(StatusCode::NOT_MODIFIED));
        assert!(body_allowed_for_status(StatusCode::OK));
        assert!(body_allowed_for_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[derive(Debug)]
    struct FixedSource {
        primary: Option<&'static str>,
        secondary: Option<&'static str>,
    }

    #[async_trait]
    impl WeatherSource for FixedSource {
        async fn fetch(&self, config: &ProviderConfig) -> Result<Vec<u8>, WeatherError> {
            let kind = ProviderKind::of(config);
            let body = match kind {
                ProviderKind::Primary => self.primary,
                ProviderKind::Secondary => self.secondary,
            };
            body.map(|b| b.as_bytes().to_vec())
                .ok_or_else(|| WeatherError::transport(kind, "connection refused"))
        }
    }

    fn test_config() -> Config {
        let provider = |primary: bool| ProviderConfig {
            base_url: "http://upstream.test".into(),
            city: "Melbourne".into(),
            unit: "metric".into(),
            access_key: "KEY".into(),
            primary,
        };
        Config {
            primary_weather_provider: provider(true),
            secondary_weather_provider: provider(false),
            stale_time: "3s".into(),
            request_timeout: None,
        }
    }

    /// Serve the router on a loopback port and return its base URL.
    async fn spawn_app(source: FixedSource) -> String {
        let service = WeatherService::new(&test_config(), Arc::new(source)).expect("service");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, router(Arc::new(service))).await.expect("server");
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn weather_endpoint_returns_reading() {
        let base = spawn_app(FixedSource {
            primary: Some(r#"{"current":{"temperature":20,"wind_speed":15}}"#),
            secondary: None,
        })
        .await;

        let res = reqwest::get(format!("{base}/v1/weather/")).await.expect("request");

        assert_eq!(res.status(), reqwest::StatusCode::OK);
        assert_eq!(
            res.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let body: serde_json::Value = res.json().await.expect("json body");
        assert_eq!(body, serde_json::json!({ "temperature_degrees": 20.0, "wind_speed": 15.0 }));
    }

    #[tokio::test]
    async fn weather_endpoint_uses_secondary_on_primary_failure() {
        let base = spawn_app(FixedSource {
            primary: None,
            secondary: Some(r#"{"main":{"temp":16.63},"wind":{"speed":3.1}}"#),
        })
        .await;

        let res = reqwest::get(format!("{base}/v1/weather/")).await.expect("request");

        assert_eq!(res.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = res.json().await.expect("json body");
        assert_eq!(body, serde_json::json!({ "temperature_degrees": 16.63, "wind_speed": 3.1 }));
    }

    #[tokio::test]
    async fn weather_endpoint_reports_failure_as_500() {
        let base = spawn_app(FixedSource { primary: Some("oops"), secondary: Some("{}") }).await;

        let res = reqwest::get(format!("{base}/v1/weather/")).await.expect("request");

        assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let body: serde_json::Value = res.json().await.expect("json body");
        let message = body["message"].as_str().expect("message field");
        assert!(message.starts_with("A system error occurred. Details:"));
        assert!(message.contains("no weather provider available"));
    }
}
