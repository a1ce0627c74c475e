//! Turns vendor payloads into the sentences fed to the prompt.
//!
//! These functions never fail: a payload missing something the text needs
//! yields [`UNFORMATTABLE`] instead.

use crate::model::{ForecastDay, kph_to_ms};
use crate::provider::WeatherPayload;

pub const UNFORMATTABLE: &str = "Could not format the weather data.";

/// "Today", "Tomorrow", then "In N days".
pub fn day_label(index: usize) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n => format!("In {n} days"),
    }
}

pub fn format_historical(payload: &WeatherPayload) -> String {
    historical_text(payload).unwrap_or_else(|| {
        tracing::warn!("historical payload is missing required fields");
        UNFORMATTABLE.to_string()
    })
}

pub fn format_forecast(payload: &WeatherPayload) -> String {
    forecast_text(payload).unwrap_or_else(|| {
        tracing::warn!("forecast payload is missing required fields");
        UNFORMATTABLE.to_string()
    })
}

fn location_line(payload: &WeatherPayload) -> Option<String> {
    let location = payload.location.as_ref()?;
    Some(format!(
        "Location: {}, {}. ",
        location.name.as_deref()?,
        location.country.as_deref()?
    ))
}

fn historical_text(payload: &WeatherPayload) -> Option<String> {
    let location = location_line(payload)?;
    let day = payload.forecast_days().first()?.day.as_ref()?;
    let wind_ms = kph_to_ms(day.maxwind_kph.unwrap_or(0.0));

    Some(format!(
        "{location}Average temperature: {}°C. \
         Minimum temperature: {}°C. \
         Maximum temperature: {}°C. \
         Conditions: {}. \
         Precipitation: {} mm. \
         Average humidity: {}%. \
         Maximum wind speed: {:.1} m/s.",
        day.avgtemp_c?,
        day.mintemp_c?,
        day.maxtemp_c?,
        day.condition.as_ref()?.text.as_deref()?,
        day.totalprecip_mm?,
        day.avghumidity?,
        wind_ms,
    ))
}

fn forecast_text(payload: &WeatherPayload) -> Option<String> {
    let mut text = location_line(payload)?;
    let current = payload.current.as_ref()?;
    text.push_str(&format!(
        "Current weather: temperature {}°C, {}. ",
        current.temp_c?,
        current.condition.as_ref()?.text.as_deref()?
    ));

    for (i, vendor_day) in payload.forecast_days().iter().enumerate() {
        let day = ForecastDay::from_vendor(vendor_day)?;
        text.push_str(&format!(
            "{} ({}): Minimum temperature: {}°C, \
             Maximum temperature: {}°C, \
             Conditions: {}, \
             Chance of rain: {}%, \
             Expected precipitation: {} mm, \
             Humidity: {}%, \
             Wind speed: {:.1} m/s. ",
            day_label(i),
            day.date,
            day.min_temp_c,
            day.max_temp_c,
            day.condition_text,
            day.rain_chance_pct,
            day.precip_mm,
            day.humidity_pct,
            day.wind_speed_ms,
        ));
    }

    Some(text)
}
