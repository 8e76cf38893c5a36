//! AI configuration from environment variables.

use std::env;
use thiserror::Error;

/// Default base URL: Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model to use.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown AI provider: {0}")]
    UnknownProvider(String),
}

/// Which backend answers completion requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Any OpenAI-compatible chat completion API (Groq by default).
    OpenAiCompatible,
    /// Canned responses, for local development without an API key.
    Fake,
}

/// AI client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// API key; empty for the fake provider.
    pub api_key: String,
    /// Model name (e.g., "llama-3.3-70b-versatile").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// - `RECIPEREADY_AI_PROVIDER`: "groq" (default) or "fake"
    /// - `GROQ_API_KEY`: required unless the provider is "fake"
    /// - `RECIPEREADY_AI_MODEL`: model name (default: "llama-3.3-70b-versatile")
    /// - `RECIPEREADY_AI_BASE_URL`: API base URL (default: Groq)
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("RECIPEREADY_AI_PROVIDER")
            .unwrap_or_else(|_| "groq".to_string())
            .as_str()
        {
            "groq" | "openai" => AiProvider::OpenAiCompatible,
            "fake" => AiProvider::Fake,
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let api_key = match provider {
            AiProvider::Fake => String::new(),
            AiProvider::OpenAiCompatible => env::var("GROQ_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?,
        };

        let model = env::var("RECIPEREADY_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let base_url =
            env::var("RECIPEREADY_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
        })
    }
}
