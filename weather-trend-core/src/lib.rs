//! Core library for the weather trend service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weatherapi.com provider and the text formatter for its payloads
//! - The webcam stream probe
//! - Prompt composition, the LLM client and the trend analyzer
//!
//! It is used by `weather-trend-server`, but the [`TrendService`] can be driven
//! from any async runtime.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod model;
pub mod probe;
pub mod prompt;
pub mod provider;
pub mod service;

pub use analyzer::TrendAnalyzer;
pub use config::{Config, SplitMode};
pub use error::TrendError;
pub use llm::{AnthropicClient, CompletionClient};
pub use model::{TrendReport, TrendResult, TrendStatus};
pub use probe::StreamProbe;
pub use provider::{WeatherApiProvider, WeatherPayload, WeatherProvider};
pub use service::TrendService;

/// Version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
