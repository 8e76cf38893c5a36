//! AI client implementation for OpenAI-compatible chat completion APIs.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;

use super::config::{AiConfig, AiProvider};
use super::fake::FakeAiClient;
use super::types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Trait for AI clients.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a chat request.
    ///
    /// `prompt_name` only labels the call in logs.
    async fn complete(&self, prompt_name: &str, request: ChatRequest)
        -> Result<ChatResponse, AiError>;

    /// Model name, for logging.
    fn model_name(&self) -> &str;
}

/// Build the client the configuration asks for.
pub fn client_from_config(config: AiConfig) -> Box<dyn AiClient> {
    match config.provider {
        AiProvider::Fake => Box::new(FakeAiClient::with_sample_recipe()),
        AiProvider::OpenAiCompatible => Box::new(OpenAiClient::new(config)),
    }
}

/// AI client for Groq or any other OpenAI-compatible endpoint.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    config: AiConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            config,
        }
    }

    /// Convert our ChatMessage to async-openai's format.
    fn to_openai_message(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, AiError> {
        match msg.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map(Into::into)
                .map_err(|e| AiError::Api(format!("Failed to build system message: {}", e))),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()
                .map(Into::into)
                .map_err(|e| AiError::Api(format!("Failed to build user message: {}", e))),
        }
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .iter()
            .map(Self::to_openai_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder.model(&self.config.model).messages(messages);

        if let Some(max_tokens) = request.max_tokens {
            req_builder.max_completion_tokens(max_tokens);
        }

        if let Some(temperature) = request.temperature {
            req_builder.temperature(temperature);
        }

        if request.json_response {
            req_builder.response_format(ResponseFormat::JsonObject);
        }

        let openai_request = req_builder
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;

        tracing::debug!(
            prompt_name = prompt_name,
            model = &self.config.model,
            "Calling AI API"
        );

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::EmptyResponse)?;

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            prompt_name = prompt_name,
            total_tokens = usage.total_tokens,
            "AI API call completed"
        );

        Ok(ChatResponse { content, usage })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_conversion() {
        let system = OpenAiClient::to_openai_message(&ChatMessage::system("be a chef"));
        assert!(matches!(
            system,
            Ok(ChatCompletionRequestMessage::System(_))
        ));

        let user = OpenAiClient::to_openai_message(&ChatMessage::user("pasta please"));
        assert!(matches!(user, Ok(ChatCompletionRequestMessage::User(_))));
    }

    #[test]
    fn test_fake_provider_from_config() {
        let config = AiConfig {
            provider: AiProvider::Fake,
            api_key: String::new(),
            model: "fake-model".to_string(),
            base_url: String::new(),
        };
        let client = client_from_config(config);
        assert_eq!(client.model_name(), "fake-model");
    }
}
