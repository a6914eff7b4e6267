use async_openai::{
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MagpieError, MagpieResult};
use crate::integrations::ContentGenerator;

const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API Key (if not provided, will use OPENAI_API_KEY env var)
    pub api_key: Option<String>,
    /// Model to use
    pub model: String,
    /// Max tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(240),
            temperature: Some(1.0),
        }
    }
}

/// OpenAI client wrapper
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client<async_openai::config::OpenAIConfig>,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(config: Option<OpenAiConfig>) -> Self {
        let config = config.unwrap_or_default();

        let mut openai_config = async_openai::config::OpenAIConfig::new();

        // Set API key if provided
        if let Some(api_key) = &config.api_key {
            openai_config = openai_config.with_api_key(api_key);
        }

        let client = Client::with_config(openai_config);

        Self { client, config }
    }

    /// Execute a prompt against the OpenAI API
    pub async fn execute_prompt(&self, prompt: &str) -> MagpieResult<String> {
        debug!("Executing prompt against OpenAI: {}", prompt);

        let message = ChatCompletionRequestMessage::User(
            async_openai::types::ChatCompletionRequestUserMessage {
                content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                    prompt.to_string(),
                ),
                name: None,
            },
        );

        let mut request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(vec![message])
            .build()
            .map_err(|e| MagpieError::content_error(e.to_string()))?;

        if let Some(max_tokens) = self.config.max_tokens {
            #[allow(deprecated)]
            {
                request.max_tokens = Some(max_tokens);
            }
        }

        if let Some(temp) = self.config.temperature {
            request.temperature = Some(temp);
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MagpieError::content_error(e.to_string()))?;

        if let Some(choice) = response.choices.first() {
            if let Some(content) = &choice.message.content {
                return Ok(content.clone());
            }
        }

        Err(MagpieError::content_error("No response from OpenAI"))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> MagpieResult<String> {
        let text = self.execute_prompt(prompt).await?;
        Ok(tidy_post_text(&text))
    }
}

/// Strip the surrounding whitespace and quote marks models like to wrap
/// short-form posts in
fn tidy_post_text(text: &str) -> String {
    text.trim().replace('"', "")
}
