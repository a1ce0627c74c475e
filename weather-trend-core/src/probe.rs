use chrono::Local;
use reqwest::Client;

use crate::{config::StreamConfig, error::TrendError, model::VideoSnapshotDescription};

const SCENE: &str = "the current frame was captured in Obzor (ancient Heliopolis, the City of the Sun)";

/// Reachability check against the webcam restream.
///
/// No frames are decoded; the description only reflects whether the stream
/// answered in time.
#[derive(Debug, Clone)]
pub struct StreamProbe {
    url: String,
    http: Client,
}

impl StreamProbe {
    pub fn new(url: String, http: Client) -> Self {
        Self { url, http }
    }

    pub fn from_config(cfg: &StreamConfig) -> Result<Self, TrendError> {
        let http = Client::builder().timeout(cfg.timeout()).build().map_err(|e| {
            TrendError::Configuration(format!("cannot build stream probe HTTP client: {e}"))
        })?;
        Ok(Self::new(cfg.url.clone(), http))
    }

    /// Always returns a description, degraded when the stream is unavailable.
    pub async fn probe(&self) -> VideoSnapshotDescription {
        let time = Local::now().format("%H:%M").to_string();

        match self.http.get(&self.url).send().await {
            Ok(res) if res.status().is_success() => {
                VideoSnapshotDescription::new(format!("{SCENE} at {time}."))
            }
            Ok(res) => {
                tracing::error!(status = %res.status(), url = %self.url, "video stream unavailable");
                VideoSnapshotDescription::new(format!(
                    "{SCENE} at {time}, but the video stream is unfortunately not accessible right now."
                ))
            }
            Err(e) => {
                tracing::error!(error = %e, url = %self.url, "video stream probe failed");
                VideoSnapshotDescription::new(format!(
                    "{SCENE} at {time}, but a problem occurred while analysing the video stream."
                ))
            }
        }
    }
}
