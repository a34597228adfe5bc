use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::corpus::preview::{preview, DatasetPreview};
use crate::corpus::summary::{summarize, CorpusSummary};
use crate::corpus::{list, ListParams, Listable};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{word_suggestions, InsightsRequest, InsightsResponse, Suggestions, MAX_SUGGESTIONS};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

fn listing<T: Listable + Serialize>(
    entity: &str,
    rows: &[T],
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = query?;
    params.validate()?;

    let page = list(rows, &params);
    debug!(
        "Listing {}: {} of {} rows",
        entity,
        page.rows.len(),
        page.pagination.total
    );
    Ok(Json(json!({
        entity: page.rows,
        "pagination": page.pagination,
    })))
}

pub async fn list_creators(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    listing("creators", &state.corpus.creators.rows, query)
}

pub async fn list_videos(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    listing("videos", &state.corpus.videos.rows, query)
}

pub async fn list_words(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    listing("words", &state.corpus.words.rows, query)
}

pub async fn data_summary(State(state): State<AppState>) -> Json<CorpusSummary> {
    Json(summarize(&state.corpus))
}

pub async fn get_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<DatasetPreview>, ApiError> {
    let Query(query) = query?;
    let per_page = query.per_page.unwrap_or(state.config.preview_rows);
    Ok(Json(preview(&state.corpus, &name, per_page)?))
}

pub async fn suggest_words(
    State(state): State<AppState>,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<Suggestions>, ApiError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(state.config.suggestion_limit)
        .min(MAX_SUGGESTIONS);
    Ok(Json(word_suggestions(&state.corpus.words.rows, &query.q, limit)))
}

pub async fn generate_insights(
    State(state): State<AppState>,
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let Json(request) = body?;
    info!(
        "Generating insights ({})",
        request.insight_type.as_deref().unwrap_or("overview")
    );
    Ok(Json(state.insights_service().generate(&request).await?))
}
