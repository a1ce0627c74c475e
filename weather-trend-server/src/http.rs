//! HTTP facade: `/`, `/health` and `/weather-trend`.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use weather_trend_core::{Config, TrendError, TrendReport, TrendService, VERSION};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>Weather Trend API</title>
    </head>
    <body>
        <h1>Weather Trend API</h1>
        <p>Weather trend analysis for Obzor, the ancient Heliopolis, combining historical data,
        the forecast and the live webcam, narrated by a language model.</p>
        <h2>Endpoints</h2>
        <ul>
            <li><code>GET /weather-trend</code> with optional <code>location</code> and
            <code>days</code> (1 to 10) parameters.
            Example: <a href="/weather-trend?location=Obzor,Bulgaria">/weather-trend?location=Obzor,Bulgaria</a></li>
            <li><code>GET /health</code> service status, version and model.</li>
        </ul>
    </body>
</html>
"#;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<TrendService>,
    model: Arc<str>,
    default_location: Arc<str>,
}

impl AppState {
    pub fn new(service: TrendService, model: &str, default_location: &str) -> Self {
        Self {
            service: Arc::new(service),
            model: Arc::from(model),
            default_location: Arc::from(default_location),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub location: Option<String>,
    pub days: Option<u32>,
}

/// Maps a failed stage onto a JSON error body.
pub struct ApiError(TrendError);

impl From<TrendError> for ApiError {
    fn from(err: TrendError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            tracing::error!(error = %self.0, "weather trend request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Unexpected error: {}", self.0))
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// GET / - Static description page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health - Liveness probe
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", version: VERSION, model: state.model.to_string() })
}

/// GET /weather-trend - Full analysis for a location
async fn weather_trend(
    State(state): State<AppState>,
    query: Result<Query<TrendQuery>, QueryRejection>,
) -> Result<Json<TrendReport>, ApiError> {
    let Query(query) = query.map_err(|e| TrendError::Validation(e.body_text()))?;
    let location = query
        .location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.default_location.to_string());

    tracing::info!(%location, days = ?query.days, "weather trend requested");
    let report = state.service.weather_trend(&location, query.days).await?;
    Ok(Json(report))
}

/// Create the HTTP router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/weather-trend", get(weather_trend))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn serve(cfg: Config) -> anyhow::Result<()> {
    cfg.report_missing_keys();

    let service = TrendService::from_config(&cfg)?;
    let state = AppState::new(service, &cfg.llm.model, &cfg.server.default_location);
    let app = router(state);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, model = %cfg.llm.model, "HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::Value;
    use std::sync::Mutex;
    use tower::ServiceExt;
    use weather_trend_core::{
        AnthropicClient, CompletionClient, SplitMode, StreamProbe, TrendAnalyzer, WeatherPayload,
        WeatherProvider,
        config::{LlmConfig, StreamConfig},
    };

    #[derive(Debug, Default)]
    struct FakeProvider {
        locations: Arc<Mutex<Vec<String>>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn historical(&self, location: &str) -> Result<WeatherPayload, TrendError> {
            self.locations.lock().unwrap().push(location.to_string());
            Ok(WeatherPayload::default())
        }

        async fn forecast(&self, _location: &str, _days: u32) -> Result<WeatherPayload, TrendError> {
            if let Some(status) = self.fail_with {
                return Err(TrendError::upstream("WeatherAPI forecast", status, "quota exceeded"));
            }
            Ok(serde_json::from_value(json!({
                "location": { "name": "Obzor", "country": "Bulgaria" },
                "current": { "temp_c": 27.0, "condition": { "text": "Clear" } }
            }))
            .unwrap())
        }
    }

    #[derive(Debug)]
    struct CannedClient;

    #[async_trait]
    impl CompletionClient for CannedClient {
        fn is_configured(&self) -> bool {
            true
        }

        async fn complete(&self, _prompt: &str) -> Result<String, TrendError> {
            Ok("1. The sky over the bay is clear.\n\n\
                2. The mood on the promenade is cheerful.\n\n\
                3. A sunny day for Heliopolis."
                .to_string())
        }
    }

    fn probe() -> StreamProbe {
        let cfg = StreamConfig { url: "http://127.0.0.1:9/stream".to_string(), timeout_secs: 1 };
        StreamProbe::from_config(&cfg).unwrap()
    }

    fn app_with(provider: FakeProvider, client: Box<dyn CompletionClient>) -> Router {
        let analyzer = TrendAnalyzer::new(client, SplitMode::Paragraphs);
        let service = TrendService::new(Box::new(provider), probe(), analyzer, 2);
        router(AppState::new(service, "test-model", "8250 Obzor, Bulgaria"))
    }

    fn app(provider: FakeProvider) -> Router {
        app_with(provider, Box::new(CannedClient))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn index_serves_html() {
        let (status, body) = get(app(FakeProvider::default()), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/weather-trend"));
    }

    #[tokio::test]
    async fn health_reports_version_and_model_without_keys() {
        let llm = AnthropicClient::from_config(&LlmConfig::default()).unwrap();
        let app = app_with(FakeProvider::default(), Box::new(llm));

        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["model"], "test-model");
    }

    #[tokio::test]
    async fn weather_trend_returns_all_fields() {
        let (status, body) = get_json(app(FakeProvider::default()), "/weather-trend?location=Obzor").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"], "Obzor");
        assert_eq!(body["country"], "Bulgaria");
        assert_eq!(body["current_temperature_c"], 27.0);
        assert_eq!(body["current_condition"], "Clear");
        assert!(body["video_snapshot_text"].as_str().unwrap().contains("Obzor"));
        assert_eq!(body["analysis"], "The sky over the bay is clear.");
        assert_eq!(body["influence"], "The mood on the promenade is cheerful.");
        assert_eq!(body["sunny_day_verdict"], "A sunny day for Heliopolis.");
        assert!(body.get("status").is_none());
    }

    #[tokio::test]
    async fn missing_location_uses_default() {
        let provider = FakeProvider::default();
        let locations = provider.locations.clone();

        let (status, _) = get(app(provider), "/weather-trend").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(*locations.lock().unwrap(), vec!["8250 Obzor, Bulgaria".to_string()]);
    }

    #[tokio::test]
    async fn out_of_range_days_is_bad_request() {
        for uri in ["/weather-trend?days=0", "/weather-trend?days=11"] {
            let (status, body) = get_json(app(FakeProvider::default()), uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["detail"].as_str().unwrap().contains("between 1 and 10"));
        }
    }

    #[tokio::test]
    async fn unparseable_days_is_json_bad_request() {
        let (status, body) = get_json(app(FakeProvider::default()), "/weather-trend?days=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("days"));
    }

    #[tokio::test]
    async fn boundary_days_are_accepted() {
        for uri in ["/weather-trend?days=1", "/weather-trend?days=10"] {
            let (status, _) = get(app(FakeProvider::default()), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn weather_failure_is_server_error() {
        let provider = FakeProvider { fail_with: Some(403), ..FakeProvider::default() };

        let (status, body) = get_json(app(provider), "/weather-trend").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Unexpected error"));
        assert!(detail.contains("403"));
    }

    #[tokio::test]
    async fn missing_llm_key_degrades_but_succeeds() {
        let llm = AnthropicClient::from_config(&LlmConfig::default()).unwrap();
        let app = app_with(FakeProvider::default(), Box::new(llm));

        let (status, body) = get_json(app, "/weather-trend").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error_detail"], "missing API key");
        assert!(body["analysis"].as_str().unwrap().contains("27"));
        assert!(!body["influence"].as_str().unwrap().is_empty());
        assert!(!body["sunny_day_verdict"].as_str().unwrap().is_empty());
    }
}
