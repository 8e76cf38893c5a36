//! Fake AI client for testing and offline development.
//!
//! Responses are matched by prompt substring, so tests run without network
//! access or API costs. Every request is recorded for later inspection.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

/// Recipe JSON returned by [`FakeAiClient::with_sample_recipe`].
pub const SAMPLE_RECIPE_JSON: &str = r#"{
  "title": "Garlic Butter Potatoes",
  "description": "Crispy roasted potatoes tossed in garlic butter and herbs.",
  "ingredients": ["4 medium potatoes", "3 tbsp butter", "4 cloves garlic, minced", "1 tsp salt", "Fresh parsley"],
  "instructions": ["Preheat the oven to 220°C.", "Cut the potatoes into wedges.", "Toss with melted garlic butter and salt.", "Roast for 35 minutes until golden.", "Sprinkle with parsley and serve."],
  "servings": 2,
  "prepTime": 10,
  "cookTime": 35,
  "difficulty": "easy",
  "cuisine": "International"
}"#;

/// A fake AI client.
///
/// If no registered substring matches, the default response is returned, or
/// an error when there is none.
#[derive(Debug, Default)]
pub struct FakeAiClient {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Default response if no match found
    default_response: Option<String>,
    /// Every request received, oldest first
    requests: RwLock<Vec<ChatRequest>>,
}

impl FakeAiClient {
    /// Create a new FakeAiClient with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FakeAiClient that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let client = Self::new();
        client.add_response(prompt_contains, response);
        client
    }

    /// A client that answers every prompt with [`SAMPLE_RECIPE_JSON`].
    pub fn with_sample_recipe() -> Self {
        Self::new().with_default_response(SAMPLE_RECIPE_JSON)
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(prompt_contains.to_lowercase(), response.to_string());
        }
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of completion calls made.
    pub fn call_count(&self) -> usize {
        self.requests.read().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        _prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let prompt_lower = request.prompt_text().to_lowercase();

        if let Ok(mut requests) = self.requests.write() {
            requests.push(request);
        }

        let matched = self.responses.read().ok().and_then(|responses| {
            responses
                .iter()
                .find(|(pattern, _)| prompt_lower.contains(pattern.as_str()))
                .map(|(_, response)| response.clone())
        });

        let content = match (matched, &self.default_response) {
            (Some(response), _) => response,
            (None, Some(response)) => response.clone(),
            (None, None) => {
                return Err(AiError::Api(format!(
                    "FakeAiClient: no response configured for prompt (first 100 chars): {}",
                    prompt_lower.chars().take(100).collect::<String>()
                )))
            }
        };

        Ok(ChatResponse {
            content,
            usage: Usage::default(),
        })
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
