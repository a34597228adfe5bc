use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::corpus::summary::{perspective_counts, statistics};
use crate::corpus::{Corpus, DatasetKind};
use crate::errors::LlmResult;
use crate::llm::{clean_llm_response, GenerateRequest, LlmProvider, PromptLibrary};
use crate::visualization::time_series::monthly_buckets;

const MAX_FALLBACK_CHARS: usize = 500;
const DEFAULT_SUMMARY: &str = "Análisis completado basado en los datos de TikTok disponibles.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    #[default]
    Overview,
    Trends,
    Sentiment,
    Demographics,
    Engagement,
}

impl InsightType {
    /// Unknown names fall back to an overview.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "trends" => InsightType::Trends,
            "sentiment" => InsightType::Sentiment,
            "demographics" => InsightType::Demographics,
            "engagement" => InsightType::Engagement,
            _ => InsightType::Overview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Overview => "overview",
            InsightType::Trends => "trends",
            InsightType::Sentiment => "sentiment",
            InsightType::Demographics => "demographics",
            InsightType::Engagement => "engagement",
        }
    }

    pub fn task(&self) -> &'static str {
        match self {
            InsightType::Overview => "Proporciona un resumen general de los datos de TikTok sobre jóvenes chilenos y política. Identifica los hallazgos más importantes.",
            InsightType::Trends => "Analiza las tendencias temporales y patrones en los datos. ¿Qué cambios se observan a lo largo del tiempo?",
            InsightType::Sentiment => "Examina el análisis de sentimientos en los datos. ¿Qué emociones y actitudes predominan?",
            InsightType::Demographics => "Analiza las características demográficas y de audiencia. ¿Qué perfiles de usuarios son más activos?",
            InsightType::Engagement => "Estudia los patrones de engagement y popularidad. ¿Qué contenido genera más interacción?",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_summary: Option<Value>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
}

impl InsightsRequest {
    /// `focus_areas` followed by the single `focus_area`, blanks dropped.
    pub fn all_focus_areas(&self) -> Vec<String> {
        let mut areas: Vec<String> = Vec::new();
        for area in self.focus_areas.iter().chain(self.focus_area.iter()) {
            let area = area.trim();
            if !area.is_empty() && !areas.iter().any(|a| a == area) {
                areas.push(area.to_string());
            }
        }
        areas
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataUsed {
    pub accounts_count: usize,
    pub videos_count: usize,
    pub subtitles_count: usize,
    pub words_count: usize,
    pub analysis_type: InsightType,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
    pub summary: String,
    pub data_used: DataUsed,
}

#[derive(Clone)]
pub struct InsightsService {
    corpus: Arc<Corpus>,
    llm: Arc<dyn LlmProvider>,
    prompts: Arc<PromptLibrary>,
    model: String,
}

impl InsightsService {
    pub fn new(
        corpus: Arc<Corpus>,
        llm: Arc<dyn LlmProvider>,
        prompts: Arc<PromptLibrary>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            corpus,
            llm,
            prompts,
            model: model.into(),
        }
    }

    pub async fn generate(&self, request: &InsightsRequest) -> LlmResult<InsightsResponse> {
        let insight_type = request
            .insight_type
            .as_deref()
            .map(InsightType::parse)
            .unwrap_or_default();
        let focus_areas = request.all_focus_areas();
        info!(
            "Generating '{}' insights (focus: {:?})",
            insight_type, focus_areas
        );

        let mut analysis = analyze(&self.corpus);
        if let (Some(client_summary), Value::Object(map)) =
            (&request.data_summary, &mut analysis)
        {
            map.insert("client_data_summary".to_string(), client_summary.clone());
        }

        let prompt = self.prompts.insights(insight_type.task(), &focus_areas, &analysis)?;
        let raw = self
            .llm
            .generate(&GenerateRequest::new(self.model.as_str(), prompt))
            .await?;
        let (insights, summary) = parse_insights(&clean_llm_response(&raw), insight_type);
        debug!("Parsed {} insights", insights.len());

        Ok(InsightsResponse {
            insights,
            summary,
            data_used: DataUsed {
                accounts_count: self.corpus.count(DatasetKind::Creators),
                videos_count: self.corpus.count(DatasetKind::Videos),
                subtitles_count: self.corpus.count(DatasetKind::Subtitles),
                words_count: self.corpus.count(DatasetKind::Words),
                analysis_type: insight_type,
                focus_areas,
            },
        })
    }
}

/// Statistics handed to the model: dataset shapes, key metrics, monthly
/// pattern and a few sample rows.
pub fn analyze(corpus: &Corpus) -> Value {
    let stats = statistics(corpus);
    let mut data_summary = Map::new();
    let mut key_metrics = Map::new();
    let mut patterns = Map::new();
    let mut samples = Map::new();

    if !corpus.creators.is_empty() {
        data_summary.insert(
            "accounts".into(),
            json!({"total_accounts": stats.creators.total, "columns": corpus.creators.table.columns}),
        );
        key_metrics.insert("political_perspectives".into(), json!(perspective_counts(corpus)));
        key_metrics.insert(
            "follower_stats".into(),
            json!({
                "avg_followers": stats.creators.avg_followers,
                "max_followers": stats.creators.max_followers,
                "min_followers": corpus.creators.rows.iter().map(|c| c.followers).min().unwrap_or(0),
            }),
        );
        samples.insert("accounts".into(), json!(corpus.creators.table.head(3)));
    }

    if !corpus.videos.is_empty() {
        data_summary.insert(
            "videos".into(),
            json!({"total_videos": stats.videos.total, "columns": corpus.videos.table.columns}),
        );
        key_metrics.insert(
            "engagement_stats".into(),
            json!({
                "total_views": stats.videos.total_views,
                "avg_views": stats.videos.avg_views,
                "max_views": stats.videos.max_views,
            }),
        );
        if let Some(range) = &stats.videos.date_range {
            key_metrics.insert(
                "date_range".into(),
                json!({"earliest": range.start, "latest": range.end}),
            );
        }
        let rows: Vec<_> = corpus.videos.rows.iter().collect();
        let monthly: Map<String, Value> = monthly_buckets(&rows)
            .into_iter()
            .map(|(month, bucket)| (month, json!(bucket.count)))
            .collect();
        if !monthly.is_empty() {
            patterns.insert("monthly_video_trends".into(), Value::Object(monthly));
        }
        samples.insert("videos".into(), json!(corpus.videos.table.head(3)));
    }

    if !corpus.subtitles.is_empty() {
        data_summary.insert(
            "subtitles".into(),
            json!({
                "total_videos_with_subtitles": stats.subtitles,
                "columns": corpus.subtitles.table.columns,
            }),
        );
        samples.insert("subtitles".into(), json!(corpus.subtitles.table.head(2)));
    }

    if !corpus.words.is_empty() {
        data_summary.insert(
            "words".into(),
            json!({"total_words": stats.words.total, "columns": corpus.words.table.columns}),
        );
        key_metrics.insert("sentiment_distribution".into(), json!(stats.words.sentiment));
        samples.insert("words".into(), json!(corpus.words.table.head(5)));
    }

    json!({
        "data_summary": data_summary,
        "key_metrics": key_metrics,
        "patterns": patterns,
        "sample_data": samples,
    })
}

#[derive(Deserialize)]
struct ModelInsights {
    #[serde(default)]
    insights: Vec<Insight>,
    #[serde(default)]
    summary: Option<String>,
}

/// Reads the model reply as JSON, then as labelled lines, then as one
/// free-form insight.
pub fn parse_insights(reply: &str, insight_type: InsightType) -> (Vec<Insight>, String) {
    let summary_or_default = |summary: Option<String>| {
        summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
    };

    if let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) {
        if start < end {
            match serde_json::from_str::<ModelInsights>(&reply[start..=end]) {
                Ok(parsed) if !parsed.insights.is_empty() => {
                    let insights = parsed
                        .insights
                        .into_iter()
                        .map(|mut insight| {
                            if insight.category.is_empty() {
                                insight.category = insight_type.as_str().to_string();
                            }
                            insight
                        })
                        .collect();
                    return (insights, summary_or_default(parsed.summary));
                }
                Ok(_) => debug!("Model JSON carried no insights"),
                Err(err) => warn!("Model reply is not valid JSON: {}", err),
            }
        }
    }

    let mut insights: Vec<Insight> = Vec::new();
    let mut summary = None;
    for line in reply.lines().map(str::trim) {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match label.trim() {
            "Título" | "Title" => insights.push(Insight {
                category: insight_type.as_str().to_string(),
                title: value,
                description: String::new(),
                metric: None,
            }),
            "Descripción" | "Description" => {
                if let Some(current) = insights.last_mut() {
                    current.description = value;
                }
            }
            "Métrica" | "Metric" => {
                if let Some(current) = insights.last_mut() {
                    current.metric = Some(value);
                }
            }
            "Resumen" | "Summary" => summary = Some(value),
            _ => {}
        }
    }
    if !insights.is_empty() {
        return (insights, summary_or_default(summary));
    }

    let reply = reply.trim();
    let description = if reply.chars().count() > MAX_FALLBACK_CHARS {
        format!("{}...", reply.chars().take(MAX_FALLBACK_CHARS).collect::<String>())
    } else {
        reply.to_string()
    };
    (
        vec![Insight {
            category: insight_type.as_str().to_string(),
            title: "Análisis General".to_string(),
            description,
            metric: Some("Basado en datos disponibles".to_string()),
        }],
        summary_or_default(summary),
    )
}
