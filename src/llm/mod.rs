//! Language model backend abstraction
//!
//! The service only needs three things from a backend: generate a completion,
//! list installed models, and report whether it is reachable. [`OllamaProvider`]
//! implements them against the Ollama HTTP API; tests substitute their own.

pub mod cleaning;
pub mod endpoint;
pub mod ollama;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::LlmResult;

pub use cleaning::clean_llm_response;
pub use endpoint::EndpointResolver;
pub use ollama::OllamaProvider;
pub use prompts::PromptLibrary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub model: String,
}

/// Sampling options sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub num_predict: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            num_predict: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub status: String,
    pub base_url: String,
    pub models: Vec<String>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the raw completion text.
    async fn generate(&self, request: &GenerateRequest) -> LlmResult<String>;

    async fn list_models(&self) -> LlmResult<Vec<ModelInfo>>;

    /// Fails when the backend cannot be reached.
    async fn status(&self) -> LlmResult<BackendStatus>;
}
