//! Turns free-form LLM output into the three narrative fields.
//!
//! The answer is cut into sections (blank-line paragraphs or non-empty lines),
//! enumeration markers are stripped, and each section is offered to the
//! buckets in priority order: analysis, influence, sunny day. A bucket keeps
//! only its first keyword match. Empty buckets then take the section at their
//! own position (0, 1, 2) in the full list, even if that section was already
//! claimed by another bucket. Anything still empty gets a fixed sentence.
//!
//! Every failure before a usable answer exists produces a degraded result
//! instead of an error, so callers always receive three non-empty fields.

use crate::{
    config::SplitMode,
    error::TrendError,
    llm::CompletionClient,
    model::{TrendPrompt, TrendResult, TrendStatus},
    provider::WeatherPayload,
};

pub const ANALYSIS_KEYWORDS: &[&str] = &["weather", "sky", "temperature"];
pub const INFLUENCE_KEYWORDS: &[&str] = &["impact", "feeling", "mood"];
pub const SUNNY_DAY_KEYWORDS: &[&str] = &["sunny", "heliopolis"];

pub const DEFAULT_ANALYSIS: &str =
    "The weather is changeable at the moment; the full picture will be clearer soon.";
pub const DEFAULT_INFLUENCE: &str =
    "Conditions are comfortable enough for a calm day; keep an eye on the forecast for changes.";
pub const DEFAULT_SUNNY_DAY: &str =
    "There is no verdict on the sunny day yet, but the Sun rarely stays away from Heliopolis for long.";

/// The three buckets after keyword and positional passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    pub analysis: String,
    pub influence: String,
    pub sunny_day: String,
}

#[derive(Debug)]
pub struct TrendAnalyzer {
    client: Box<dyn CompletionClient>,
    split_mode: SplitMode,
}

impl TrendAnalyzer {
    pub fn new(client: Box<dyn CompletionClient>, split_mode: SplitMode) -> Self {
        Self { client, split_mode }
    }

    /// Never fails: upstream problems come back as a degraded [`TrendResult`].
    ///
    /// `forecast` is only read on the degraded paths, for the current temperature.
    pub async fn analyze(&self, prompt: &TrendPrompt, forecast: &WeatherPayload) -> TrendResult {
        if !self.client.is_configured() {
            tracing::warn!("LLM API key missing, skipping trend analysis");
            return missing_key_result(forecast.current_temp_c());
        }

        match self.client.complete(prompt.as_str()).await {
            Ok(text) => {
                let sections = parse_sections(&text, self.split_mode);
                TrendResult {
                    analysis: sections.analysis,
                    influence: sections.influence,
                    sunny_day_verdict: sections.sunny_day,
                    status: TrendStatus::Ok,
                    error_detail: None,
                }
            }
            Err(err) => match err.upstream_status() {
                Some(status) => upstream_failure_result(status, &err),
                None => system_error_result(&err),
            },
        }
    }
}

/// Split generated text into candidate sections with markers removed.
pub fn split_sections(text: &str, mode: SplitMode) -> Vec<String> {
    let raw: Vec<String> = match mode {
        SplitMode::Lines => text.lines().map(str::to_string).collect(),
        SplitMode::Paragraphs => {
            let mut paragraphs = Vec::new();
            let mut current: Vec<&str> = Vec::new();
            for line in text.lines() {
                if line.trim().is_empty() {
                    if !current.is_empty() {
                        paragraphs.push(current.join("\n"));
                        current.clear();
                    }
                } else {
                    current.push(line.trim());
                }
            }
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
            }
            paragraphs
        }
    };

    raw.iter()
        .map(|s| strip_enumeration(s.trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Drop a leading "1." / "2)" style marker.
fn strip_enumeration(section: &str) -> &str {
    let digits = section.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return section;
    }
    match section.as_bytes().get(digits) {
        Some(b'.') | Some(b')') => section[digits + 1..].trim_start(),
        _ => section,
    }
}

fn contains_any(section: &str, keywords: &[&str]) -> bool {
    let lower = section.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn parse_sections(text: &str, mode: SplitMode) -> Sections {
    let sections = split_sections(text, mode);
    tracing::debug!(count = sections.len(), "classifying model output");

    let mut analysis: Option<&str> = None;
    let mut influence: Option<&str> = None;
    let mut sunny_day: Option<&str> = None;

    for section in sections.iter().map(String::as_str) {
        if analysis.is_none() && contains_any(section, ANALYSIS_KEYWORDS) {
            analysis = Some(section);
        } else if influence.is_none() && contains_any(section, INFLUENCE_KEYWORDS) {
            influence = Some(section);
        } else if sunny_day.is_none() && contains_any(section, SUNNY_DAY_KEYWORDS) {
            sunny_day = Some(section);
        }
    }

    Sections {
        analysis: fill(analysis, &sections, 0, DEFAULT_ANALYSIS),
        influence: fill(influence, &sections, 1, DEFAULT_INFLUENCE),
        sunny_day: fill(sunny_day, &sections, 2, DEFAULT_SUNNY_DAY),
    }
}

// positional fallback indexes the full list, not the unclaimed remainder
fn fill<'a>(slot: Option<&'a str>, sections: &'a [String], index: usize, default: &'a str) -> String {
    slot.or_else(|| sections.get(index).map(String::as_str)).unwrap_or(default).to_string()
}

fn missing_key_result(temperature_c: Option<f64>) -> TrendResult {
    let temperature = temperature_c.map_or_else(|| "N/A".to_string(), |t| t.to_string());

    TrendResult {
        analysis: format!(
            "The current temperature in Obzor is {temperature}°C. A detailed analysis is not \
             available because the AI service is not configured."
        ),
        influence: "Keep an eye on the forecast for changes in the conditions.".to_string(),
        sunny_day_verdict: "Information about the sunny day is not available at the moment."
            .to_string(),
        status: TrendStatus::Error,
        error_detail: Some("missing API key".to_string()),
    }
}

fn upstream_failure_result(status: u16, err: &TrendError) -> TrendResult {
    tracing::error!(status, error = %err, "trend analysis failed upstream");

    TrendResult {
        analysis: format!(
            "Sorry, we could not determine the weather trend because of a technical problem \
             (HTTP {status})."
        ),
        influence: format!(
            "Sorry, the impact on people could not be assessed (HTTP {status}). Please check the \
             current forecast from another source."
        ),
        sunny_day_verdict: format!("Sorry, the sunny day verdict is unavailable (HTTP {status})."),
        status: TrendStatus::Error,
        error_detail: Some(format!("LLM API returned HTTP {status}: {err}")),
    }
}

fn system_error_result(err: &TrendError) -> TrendResult {
    tracing::error!(error = %err, "trend analysis failed");

    TrendResult {
        analysis: "The weather in Obzor is changeable at the moment. Please check the latest \
                   forecast."
            .to_string(),
        influence: "We recommend keeping an eye on the weather conditions for changes."
            .to_string(),
        sunny_day_verdict: "Information about the sunny day is not available at the moment."
            .to_string(),
        status: TrendStatus::Error,
        error_detail: Some(format!("system error: {err}")),
    }
}
