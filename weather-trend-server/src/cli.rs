use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_trend_core::Config;

use crate::http;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-trend", version, about = "Weather trend analysis service")]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set, e.g. "debug" or "weather_trend_core=trace".
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Bind address; overrides the config file.
        #[arg(long)]
        host: Option<String>,

        /// Listen port; overrides the config file.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the WeatherAPI and Anthropic API keys in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Serve { host: None, port: None }) {
            Command::Serve { host, port } => {
                let mut cfg = Config::load()?;
                if let Some(host) = host {
                    cfg.server.host = host;
                }
                if let Some(port) = port {
                    cfg.server.port = port;
                }
                http::serve(cfg).await
            }
            Command::Configure => configure(),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    if let Some(key) = prompt_key("WeatherAPI key (empty keeps the current one):")? {
        cfg.weather.api_key = Some(key);
    }
    if let Some(key) = prompt_key("Anthropic API key (empty keeps the current one):")? {
        cfg.llm.api_key = Some(key);
    }

    cfg.save_to(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn prompt_key(message: &str) -> anyhow::Result<Option<String>> {
    let key = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}
