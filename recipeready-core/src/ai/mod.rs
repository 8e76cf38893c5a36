//! AI client module for LLM integration.
//!
//! This module provides:
//! - `AiClient` trait for abstracting AI providers
//! - `OpenAiClient` for Groq and other OpenAI-compatible endpoints
//! - `FakeAiClient` with canned responses for tests and offline use
//! - Configuration via environment variables
//! - Prompt templates
//!
//! # Configuration
//!
//! - `GROQ_API_KEY` (required for the real provider)
//! - `RECIPEREADY_AI_PROVIDER` (optional): "groq" or "fake"
//! - `RECIPEREADY_AI_MODEL` (optional): model name
//! - `RECIPEREADY_AI_BASE_URL` (optional): API base URL

mod client;
mod config;
mod fake;
pub mod prompts;
mod types;

pub use client::{client_from_config, AiClient, AiError, OpenAiClient};
pub use config::{AiConfig, AiProvider, ConfigError, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use fake::{FakeAiClient, SAMPLE_RECIPE_JSON};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};
