use crate::{
    analyzer::TrendAnalyzer,
    config::Config,
    error::TrendError,
    format::{format_forecast, format_historical},
    llm::AnthropicClient,
    model::{TrendReport, WeatherSnapshot},
    probe::StreamProbe,
    prompt::compose,
    provider::{WeatherApiProvider, WeatherProvider, validate_days},
};

/// Runs one `/weather-trend` request end to end: fetch, format, compose, analyze.
#[derive(Debug)]
pub struct TrendService {
    provider: Box<dyn WeatherProvider>,
    probe: StreamProbe,
    analyzer: TrendAnalyzer,
    forecast_days: u32,
}

impl TrendService {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        probe: StreamProbe,
        analyzer: TrendAnalyzer,
        forecast_days: u32,
    ) -> Self {
        Self { provider, probe, analyzer, forecast_days }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, TrendError> {
        let provider = WeatherApiProvider::from_config(&cfg.weather)?;
        let probe = StreamProbe::from_config(&cfg.stream)?;
        let client = AnthropicClient::from_config(&cfg.llm)?;
        let analyzer = TrendAnalyzer::new(Box::new(client), cfg.llm.split_mode);

        Ok(Self::new(Box::new(provider), probe, analyzer, cfg.weather.forecast_days))
    }

    /// Weather fetch failures propagate; the probe and analyzer always produce a value.
    pub async fn weather_trend(
        &self,
        location: &str,
        days: Option<u32>,
    ) -> Result<TrendReport, TrendError> {
        let days = validate_days(days.unwrap_or(self.forecast_days))?;

        let (historical, forecast, video) = tokio::join!(
            self.provider.historical(location),
            self.provider.forecast(location, days),
            self.probe.probe(),
        );
        let historical = historical?;
        let forecast = forecast?;

        let historical_text = format_historical(&historical);
        let forecast_text = format_forecast(&forecast);
        let prompt = compose(
            Some(video.as_str()),
            Some(historical_text.as_str()),
            Some(forecast_text.as_str()),
        );

        let trend = self.analyzer.analyze(&prompt, &forecast).await;
        if trend.is_degraded() {
            tracing::warn!(location, detail = ?trend.error_detail, "returning degraded trend");
        }

        Ok(TrendReport::new(WeatherSnapshot::from_payload(&forecast), video, trend))
    }
}
