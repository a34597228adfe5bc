use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::corpus::DatasetKind;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let datasets: serde_json::Map<String, Value> = DatasetKind::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), json!(state.corpus.count(*kind))))
        .collect();

    Json(json!({
        "status": "healthy",
        "service": "tiktok-insights",
        "version": env!("CARGO_PKG_VERSION"),
        "datasets": datasets,
    }))
}

pub async fn llm_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.llm.status().await {
        Ok(status) => Ok(Json(json!(status))),
        Err(err) => {
            warn!("{} backend unavailable: {}", state.llm.name(), err);
            Err(ApiError::Unavailable(format!(
                "Ollama no está disponible: {}",
                err
            )))
        }
    }
}

pub async fn list_models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let models = state.llm.list_models().await?;
    Ok(Json(json!({ "models": models })))
}
