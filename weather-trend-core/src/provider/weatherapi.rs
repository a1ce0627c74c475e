use async_trait::async_trait;
use chrono::{Local, TimeDelta};
use reqwest::Client;
use serde::Deserialize;

use crate::{config::WeatherConfig, error::TrendError};

use super::{WeatherProvider, validate_days};

const HISTORY_SERVICE: &str = "WeatherAPI history";
const FORECAST_SERVICE: &str = "WeatherAPI forecast";

/// weatherapi.com client for the history and forecast endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    lang: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: Option<String>, base_url: String, lang: String, http: Client) -> Self {
        Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), lang, http }
    }

    pub fn from_config(cfg: &WeatherConfig) -> Result<Self, TrendError> {
        let http = Client::builder().timeout(cfg.timeout()).build().map_err(|e| {
            TrendError::Configuration(format!("cannot build WeatherAPI HTTP client: {e}"))
        })?;

        let api_key = cfg.api_key.clone().filter(|k| !k.trim().is_empty());
        Ok(Self::new(api_key, cfg.base_url.clone(), cfg.lang.clone(), http))
    }

    fn api_key(&self) -> Result<&str, TrendError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| TrendError::Configuration("WEATHER_API_KEY is not provided".to_string()))
    }

    async fn fetch(
        &self,
        service: &'static str,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<WeatherPayload, TrendError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TrendError::network(service, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| TrendError::network(service, e))?;

        if !status.is_success() {
            tracing::error!(%status, service, "weather request failed");
            return Err(TrendError::upstream(service, status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TrendError::Malformed { service, message: e.to_string() })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn historical(&self, location: &str) -> Result<WeatherPayload, TrendError> {
        let key = self.api_key()?;
        let yesterday = yesterday();

        tracing::info!(location, date = %yesterday, "fetching historical weather");
        self.fetch(
            HISTORY_SERVICE,
            "history.json",
            &[("key", key), ("q", location), ("dt", yesterday.as_str()), ("lang", self.lang.as_str())],
        )
        .await
    }

    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherPayload, TrendError> {
        let days = validate_days(days)?;
        let key = self.api_key()?;

        let days = days.to_string();

        tracing::info!(location, %days, "fetching weather forecast");
        self.fetch(
            FORECAST_SERVICE,
            "forecast.json",
            &[("key", key), ("q", location), ("days", days.as_str()), ("lang", self.lang.as_str())],
        )
        .await
    }
}

fn yesterday() -> String {
    (Local::now() - TimeDelta::days(1)).format("%Y-%m-%d").to_string()
}

/// Vendor weather payload. Every field is optional: the formatter decides what
/// is usable, so a sparse document never fails deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    pub location: Option<WaLocation>,
    pub current: Option<WaCurrent>,
    pub forecast: Option<WaForecast>,
}

impl WeatherPayload {
    pub fn current_temp_c(&self) -> Option<f64> {
        self.current.as_ref().and_then(|c| c.temp_c)
    }

    pub fn forecast_days(&self) -> &[WaForecastDay] {
        self.forecast.as_ref().map(|f| f.forecastday.as_slice()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaLocation {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaCondition {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaCurrent {
    pub temp_c: Option<f64>,
    pub condition: Option<WaCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaForecast {
    #[serde(default)]
    pub forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaForecastDay {
    pub date: Option<String>,
    pub day: Option<WaDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaDay {
    pub avgtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub maxtemp_c: Option<f64>,
    pub condition: Option<WaCondition>,
    pub totalprecip_mm: Option<f64>,
    pub avghumidity: Option<f64>,
    pub daily_chance_of_rain: Option<f64>,
    pub maxwind_kph: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn provider(server: &MockServer, key: Option<&str>) -> WeatherApiProvider {
        WeatherApiProvider::new(
            key.map(str::to_string),
            server.uri(),
            "en".to_string(),
            Client::new(),
        )
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "location": { "name": "Obzor", "country": "Bulgaria" },
            "current": { "temp_c": 22.0, "condition": { "text": "Sunny" } },
            "forecast": { "forecastday": [] }
        })
    }

    #[tokio::test]
    async fn forecast_sends_key_location_and_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "Obzor"))
            .and(query_param("days", "2"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = provider(&server, Some("KEY")).forecast("Obzor", 2).await.unwrap();

        assert_eq!(payload.current_temp_c(), Some(22.0));
    }

    #[tokio::test]
    async fn forecast_rejects_out_of_range_days_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server, Some("KEY"));

        for days in [0, 11] {
            let err = provider.forecast("Obzor", days).await.unwrap_err();
            assert!(matches!(err, TrendError::Validation(_)), "days={days}: {err}");
        }
    }

    #[tokio::test]
    async fn forecast_accepts_boundary_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server, Some("KEY"));

        assert!(provider.forecast("Obzor", 1).await.is_ok());
        assert!(provider.forecast("Obzor", 10).await.is_ok());
    }

    #[tokio::test]
    async fn missing_key_is_configuration_error_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server, None);

        let err = provider.historical("Obzor").await.unwrap_err();
        assert!(matches!(err, TrendError::Configuration(_)));

        let err = provider.forecast("Obzor", 2).await.unwrap_err();
        assert!(matches!(err, TrendError::Configuration(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .respond_with(ResponseTemplate::new(401).set_body_string("API key is invalid."))
            .mount(&server)
            .await;

        let err = provider(&server, Some("BAD")).historical("Obzor").await.unwrap_err();

        assert_eq!(err.upstream_status(), Some(401));
        assert!(err.to_string().contains("API key is invalid."));
    }

    #[tokio::test]
    async fn historical_asks_for_yesterday() {
        let server = MockServer::start().await;
        let yesterday = yesterday();

        Mock::given(method("GET"))
            .and(path("/history.json"))
            .and(query_param("dt", yesterday.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(provider(&server, Some("KEY")).historical("Obzor").await.is_ok());
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server, Some("KEY")).forecast("Obzor", 1).await.unwrap_err();

        assert!(matches!(err, TrendError::Malformed { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let provider = WeatherApiProvider::new(
            Some("KEY".into()),
            "http://127.0.0.1:9".to_string(),
            "en".to_string(),
            Client::new(),
        );

        let err = provider.forecast("Obzor", 1).await.unwrap_err();

        assert!(matches!(err, TrendError::Network { .. }));
    }

    #[tokio::test]
    async fn slow_vendor_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(forecast_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        let cfg = WeatherConfig {
            api_key: Some("KEY".to_string()),
            base_url: server.uri(),
            timeout_secs: 1,
            ..WeatherConfig::default()
        };

        let err = WeatherApiProvider::from_config(&cfg)
            .unwrap()
            .forecast("Obzor", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, TrendError::Network { .. }));
    }
}
