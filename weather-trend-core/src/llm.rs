use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::TrendError;

pub mod anthropic;

pub use anthropic::AnthropicClient;

/// Single request/response round trip to a hosted language model.
#[async_trait]
pub trait CompletionClient: Send + Sync + Debug {
    /// Whether credentials are present. Without them no call is attempted.
    fn is_configured(&self) -> bool;

    /// Send `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, TrendError>;
}
