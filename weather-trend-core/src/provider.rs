use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::TrendError;

pub mod weatherapi;

pub use weatherapi::{WeatherApiProvider, WeatherPayload};

pub const MIN_FORECAST_DAYS: u32 = 1;
pub const MAX_FORECAST_DAYS: u32 = 10;

/// Source of raw weather payloads. One attempt per call, no retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Observed weather for the previous day.
    async fn historical(&self, location: &str) -> Result<WeatherPayload, TrendError>;

    /// Current conditions plus a `days`-long forecast window.
    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherPayload, TrendError>;
}

/// Check a forecast window before any request is made.
pub fn validate_days(days: u32) -> Result<u32, TrendError> {
    if (MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(TrendError::Validation(format!(
            "days must be between {MIN_FORECAST_DAYS} and {MAX_FORECAST_DAYS}, got {days}"
        )))
    }
}
