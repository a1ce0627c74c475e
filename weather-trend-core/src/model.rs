use serde::{Serialize, Serializer};
use std::fmt;

use crate::provider::weatherapi::{WaForecastDay, WeatherPayload};

pub const UNKNOWN: &str = "Unknown";

/// Location and current conditions pulled out of a vendor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub temperature_c: Option<f64>,
    pub condition_text: String,
}

impl WeatherSnapshot {
    pub fn from_payload(payload: &WeatherPayload) -> Self {
        let location = payload.location.as_ref();
        let current = payload.current.as_ref();

        Self {
            location_name: location
                .and_then(|l| l.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            country: location
                .and_then(|l| l.country.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            temperature_c: current.and_then(|c| c.temp_c),
            condition_text: current
                .and_then(|c| c.condition.as_ref())
                .and_then(|c| c.text.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// One day of a forecast window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: String,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub condition_text: String,
    pub rain_chance_pct: f64,
    pub precip_mm: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
}

impl ForecastDay {
    /// Returns `None` when any field the forecast text relies on is missing.
    pub fn from_vendor(day: &WaForecastDay) -> Option<Self> {
        let data = day.day.as_ref()?;

        Some(Self {
            date: day.date.clone()?,
            min_temp_c: data.mintemp_c?,
            max_temp_c: data.maxtemp_c?,
            condition_text: data.condition.as_ref()?.text.clone()?,
            rain_chance_pct: data.daily_chance_of_rain?,
            precip_mm: data.totalprecip_mm?,
            humidity_pct: data.avghumidity?,
            wind_speed_ms: kph_to_ms(data.maxwind_kph.unwrap_or(0.0)),
        })
    }
}

/// km/h to m/s, rounded to one decimal place with ties to even.
pub fn kph_to_ms(kph: f64) -> f64 {
    (kph / 3.6 * 10.0).round_ties_even() / 10.0
}

/// Text describing the webcam frame at probe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSnapshotDescription(String);

impl VideoSnapshotDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoSnapshotDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully composed instruction sent to the LLM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPrompt(String);

impl TrendPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    #[default]
    Ok,
    Error,
}

impl TrendStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, TrendStatus::Ok)
    }
}

/// Narrative produced by the analyzer; all three text fields are always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub analysis: String,
    pub influence: String,
    pub sunny_day_verdict: String,
    #[serde(skip_serializing_if = "TrendStatus::is_ok")]
    pub status: TrendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl TrendResult {
    pub fn is_degraded(&self) -> bool {
        !self.status.is_ok()
    }
}

/// Client-facing body of `/weather-trend`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub location: String,
    pub country: String,
    #[serde(serialize_with = "temperature_or_na")]
    pub current_temperature_c: Option<f64>,
    pub current_condition: String,
    pub video_snapshot_text: String,
    #[serde(flatten)]
    pub trend: TrendResult,
}

impl TrendReport {
    pub fn new(snapshot: WeatherSnapshot, video: VideoSnapshotDescription, trend: TrendResult) -> Self {
        Self {
            location: snapshot.location_name,
            country: snapshot.country,
            current_temperature_c: snapshot.temperature_c,
            current_condition: snapshot.condition_text,
            video_snapshot_text: video.0,
            trend,
        }
    }
}

/// Serializes a missing temperature as the string `"N/A"`.
pub fn temperature_or_na<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(t) => s.serialize_f64(*t),
        None => s.serialize_str("N/A"),
    }
}
