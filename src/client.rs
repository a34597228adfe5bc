//! HTTP client for the dashboard API
//!
//! Catalogue calls (models, listings, dataset previews) fail fast; calls that
//! wait on the language model get the long timeout. Error bodies are surfaced
//! through their `detail` (or `message`) field unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::corpus::{ListParams, Pagination};
use crate::errors::{ClientError, ClientResult};
use crate::llm::ModelInfo;
use crate::services::{ChatRequest, ChatResponse, InsightsRequest, InsightsResponse, Suggestions};
use crate::session::ChatBackend;
use crate::visualization::VisualizationPayload;

pub const DEFAULT_SHORT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_LONG_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct ModelsEnvelope {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct VisualizationEnvelope {
    visualization: VisualizationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    base: Url,
    fast: Client,
    slow: Client,
}

impl DashboardClient {
    /// `base_url` points at the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeouts(base_url, DEFAULT_SHORT_TIMEOUT, DEFAULT_LONG_TIMEOUT)
    }

    pub fn with_timeouts(base_url: &str, short: Duration, long: Duration) -> ClientResult<Self> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            fast: Client::builder().timeout(short).build()?,
            slow: Client::builder().timeout(long).build()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> ClientResult<Value> {
        Self::send(self.fast.get(self.url("health")?)).await
    }

    pub async fn models(&self) -> ClientResult<Vec<ModelInfo>> {
        let envelope: ModelsEnvelope = Self::send(self.fast.get(self.url("models")?)).await?;
        Ok(envelope.models)
    }

    pub async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatResponse> {
        Self::send(self.slow.post(self.url("chat")?).json(request)).await
    }

    pub async fn visualize(
        &self,
        query: &str,
        visualization_type: Option<&str>,
    ) -> ClientResult<VisualizationPayload> {
        let body = json!({"query": query, "visualization_type": visualization_type});
        let envelope: VisualizationEnvelope =
            Self::send(self.slow.post(self.url("visualize")?).json(&body)).await?;
        Ok(envelope.visualization)
    }

    pub async fn word_suggestions(&self, query: &str, limit: usize) -> ClientResult<Suggestions> {
        let request = self
            .fast
            .get(self.url("word-suggestions")?)
            .query(&[("q", query.to_string()), ("limit", limit.to_string())]);
        Self::send(request).await
    }

    /// One page of `creators`, `videos` or `words`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        entity: &str,
        params: &ListParams,
    ) -> ClientResult<ListingPage<T>> {
        let request = self.fast.get(self.url(&format!("data/{}", entity))?).query(params);
        let mut body: Value = Self::send(request).await?;
        let rows = serde_json::from_value(body[entity].take()).map_err(|err| ClientError::Api {
            status: 200,
            message: format!("Unexpected listing body: {}", err),
        })?;
        let pagination = serde_json::from_value(body["pagination"].take()).map_err(|err| {
            ClientError::Api {
                status: 200,
                message: format!("Unexpected pagination: {}", err),
            }
        })?;
        Ok(ListingPage { rows, pagination })
    }

    pub async fn summary(&self) -> ClientResult<Value> {
        Self::send(self.fast.get(self.url("data/summary")?)).await
    }

    pub async fn dataset(&self, name: &str, per_page: Option<usize>) -> ClientResult<Value> {
        let mut request = self.fast.get(self.url(&format!("dataset/{}", name))?);
        if let Some(per_page) = per_page {
            request = request.query(&[("per_page", per_page)]);
        }
        Self::send(request).await
    }

    pub async fn insights(&self, request: &InsightsRequest) -> ClientResult<InsightsResponse> {
        Self::send(self.slow.post(self.url("data/insights")?).json(request)).await
    }
}

async fn error_for_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("API error {}: {}", status, body);
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(&body)
            .unwrap_or_else(|| format!("HTTP {}", status)),
    })
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl ChatBackend for DashboardClient {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        Ok(DashboardClient::chat(self, request).await?)
    }
}
