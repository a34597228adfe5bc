use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{ChatRequest, ChatResponse};
use crate::visualization;

#[derive(Debug, Deserialize)]
pub struct VisualizeRequest {
    pub query: String,
    #[serde(default)]
    pub visualization_type: Option<String>,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body?;
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }
    info!("Chat query: {}", request.query.trim());

    let response = state.chat_service().chat(&request).await?;
    Ok(Json(response))
}

pub async fn visualize(
    State(state): State<AppState>,
    body: Result<Json<VisualizeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }

    let corpus = state.corpus.clone();
    let requested = request.visualization_type;
    let payload = tokio::task::spawn_blocking(move || {
        visualization::generate(&corpus, &query, requested.as_deref())
    })
    .await?;
    debug!("Visualization generated: {:?}", payload.type_name());

    Ok(Json(json!({ "visualization": payload })))
}
