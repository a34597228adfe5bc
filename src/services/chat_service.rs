use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::corpus::summary::{statistics, CorpusStatistics};
use crate::corpus::{Corpus, DatasetKind};
use crate::errors::LlmResult;
use crate::llm::{clean_llm_response, GenerateRequest, LlmProvider, PromptLibrary};
use crate::relevance::{RankedDataset, RelevanceBucket, RelevanceRanker};
use crate::visualization::{self, VisualizationPayload};

const CONTEXT_SAMPLE_ROWS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub generate_visualization: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A dataset the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub dataset: String,
    pub filename: String,
    pub description: String,
    pub contains: String,
    pub relevance_score: f64,
    pub relevance: RelevanceBucket,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_data: Option<Value>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<VisualizationPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_error: Option<String>,
}

/// Answers free-text questions with the language model, grounded on the
/// datasets the ranker judges relevant.
#[derive(Clone)]
pub struct ChatService {
    corpus: Arc<Corpus>,
    llm: Arc<dyn LlmProvider>,
    ranker: Arc<dyn RelevanceRanker>,
    prompts: Arc<PromptLibrary>,
    default_model: String,
}

impl ChatService {
    pub fn new(
        corpus: Arc<Corpus>,
        llm: Arc<dyn LlmProvider>,
        ranker: Arc<dyn RelevanceRanker>,
        prompts: Arc<PromptLibrary>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            corpus,
            llm,
            ranker,
            prompts,
            default_model: default_model.into(),
        }
    }

    pub async fn chat(&self, request: &ChatRequest) -> LlmResult<ChatResponse> {
        let query = request.query.trim();
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);
        info!(
            "Chat query '{}' (model: {}, visualization: {})",
            query, model, request.generate_visualization
        );

        let ranked = self.ranker.rank(query, &self.corpus);
        debug!("Ranked datasets: {:?}", ranked);
        let sources = data_sources(&self.corpus, &ranked);
        let context = relevant_context(&self.corpus, &ranked);

        let prompt = self.prompts.chat(query, &context, &sources)?;
        let raw = self.llm.generate(&GenerateRequest::new(model, prompt)).await?;
        let answer = clean_llm_response(&raw);

        let mut response = ChatResponse {
            answer,
            query_analysis: Some(format!(
                "Consulta: '{}' - Se identificaron {} fuentes de datos relevantes",
                query,
                sources.len()
            )),
            relevant_data: Some(context),
            data_sources: sources,
            ..Default::default()
        };

        if request.generate_visualization {
            let payload = visualization::generate(
                &self.corpus,
                query,
                request.visualization_type.as_deref(),
            );
            match payload.error() {
                Some(error) => {
                    warn!("Visualization for '{}' failed: {}", query, error);
                    response.visualization_error = Some(error.to_string());
                }
                None => response.visualization = Some(payload),
            }
        }

        Ok(response)
    }
}

pub fn data_sources(corpus: &Corpus, ranked: &[RankedDataset]) -> Vec<DataSource> {
    ranked
        .iter()
        .map(|r| {
            let table = corpus.table(r.kind);
            DataSource {
                dataset: r.kind.as_str().to_string(),
                filename: table.filename.clone(),
                description: r.kind.description().to_string(),
                contains: r.kind.contains().to_string(),
                relevance_score: r.score,
                relevance: RelevanceBucket::from_score(r.score),
                rows: corpus.count(r.kind),
                columns: table.columns.clone(),
            }
        })
        .collect()
}

/// Shape, sample rows and statistics of each ranked dataset, keyed by name.
pub fn relevant_context(corpus: &Corpus, ranked: &[RankedDataset]) -> Value {
    let stats = statistics(corpus);
    let mut context = Map::new();
    for r in ranked {
        let table = corpus.table(r.kind);
        context.insert(
            r.kind.as_str().to_string(),
            json!({
                "filename": table.filename,
                "rows": corpus.count(r.kind),
                "columns": table.columns,
                "sample": table.head(CONTEXT_SAMPLE_ROWS),
                "statistics": dataset_statistics(&stats, r.kind),
                "relevance_score": r.score,
            }),
        );
    }
    Value::Object(context)
}

fn dataset_statistics(stats: &CorpusStatistics, kind: DatasetKind) -> Value {
    let value = match kind {
        DatasetKind::Creators => serde_json::to_value(&stats.creators),
        DatasetKind::Videos => serde_json::to_value(&stats.videos),
        DatasetKind::Words => serde_json::to_value(&stats.words),
        DatasetKind::Subtitles => Ok(json!({ "total": stats.subtitles })),
    };
    value.unwrap_or(Value::Null)
}
