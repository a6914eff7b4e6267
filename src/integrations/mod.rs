// Content generation abstraction
// Post text comes from an LLM behind this boundary.

pub mod openai;

pub use openai::{OpenAiClient, OpenAiConfig};

use async_trait::async_trait;

use crate::error::MagpieResult;

/// Trait for content generators
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate post text for a prompt
    async fn generate(&self, prompt: &str) -> MagpieResult<String>;
}
