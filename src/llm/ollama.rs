//! Ollama LLM provider implementation

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{BackendStatus, EndpointResolver, GenerateRequest, GenerationOptions, LlmProvider, ModelInfo};
use crate::config::LlmConfig;
use crate::errors::{LlmError, LlmResult};

pub struct OllamaProvider {
    client: Client,
    resolver: EndpointResolver,
}

impl OllamaProvider {
    pub fn new(resolver: EndpointResolver, request_timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, resolver })
    }

    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        Self::new(EndpointResolver::from_config(config)?, config.request_timeout())
    }

    async fn get_tags(&self) -> LlmResult<(String, OllamaTagsResponse)> {
        let base_url = self.resolver.base_url().await?;
        let response = match self.client.get(format!("{}/api/tags", base_url)).send().await {
            Ok(response) => response,
            Err(err) => {
                self.resolver.invalidate().await;
                return Err(err.into());
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        Ok((base_url, tags))
    }
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
    #[serde(default)]
    model: Option<String>,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerateRequest) -> LlmResult<String> {
        let base_url = self.resolver.base_url().await?;
        let url = format!("{}/api/generate", base_url);
        let body = OllamaGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: &request.options,
        };

        info!("Sending prompt to {} with model {}", base_url, request.model);
        let start = Instant::now();

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Generation request to {} failed: {}", url, err);
                self.resolver.invalidate().await;
                return Err(err.into());
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;

        let duration_ms = parsed
            .total_duration
            .map(|ns| ns / 1_000_000)
            .unwrap_or_else(|| start.elapsed().as_millis() as u64);
        debug!("Generation finished in {} ms", duration_ms);

        Ok(parsed.response)
    }

    async fn list_models(&self) -> LlmResult<Vec<ModelInfo>> {
        let (_, tags) = self.get_tags().await?;
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                model: m.model.unwrap_or_else(|| m.name.clone()),
                name: m.name,
            })
            .collect())
    }

    async fn status(&self) -> LlmResult<BackendStatus> {
        let (base_url, tags) = self.get_tags().await?;
        Ok(BackendStatus {
            status: "available".to_string(),
            base_url,
            models: tags.models.into_iter().map(|m| m.name).collect(),
        })
    }
}
