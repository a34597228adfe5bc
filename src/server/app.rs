use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::OriginalUri,
    http::HeaderValue,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{chat, data, health};
use super::ApiError;
use crate::config::AppConfig;
use crate::corpus::Corpus;
use crate::llm::{LlmProvider, PromptLibrary};
use crate::relevance::RelevanceRanker;
use crate::services::{ChatService, InsightsService};

#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub llm: Arc<dyn LlmProvider>,
    pub ranker: Arc<dyn RelevanceRanker>,
    pub prompts: Arc<PromptLibrary>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn chat_service(&self) -> ChatService {
        ChatService::new(
            self.corpus.clone(),
            self.llm.clone(),
            self.ranker.clone(),
            self.prompts.clone(),
            self.config.llm.default_model.clone(),
        )
    }

    pub fn insights_service(&self) -> InsightsService {
        InsightsService::new(
            self.corpus.clone(),
            self.llm.clone(),
            self.prompts.clone(),
            self.config.llm.default_model.clone(),
        )
    }
}

pub fn create_app(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let static_dir = state.config.static_dir.clone();

    let app = Router::new()
        .nest("/api", api_routes())
        .with_state(state);

    // Anything outside /api is the front-end bundle
    let app = match static_dir {
        Some(dir) => app.fallback_service(static_bundle(&dir)),
        None => app.fallback(banner),
    };

    Ok(app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/status/llm", get(health::llm_status))
        .route("/models", get(health::list_models))
        .route("/chat", post(chat::chat))
        .route("/visualize", post(chat::visualize))
        .route("/word-suggestions", get(data::suggest_words))
        // Corpus routes
        .route("/data/creators", get(data::list_creators))
        .route("/data/videos", get(data::list_videos))
        .route("/data/words", get(data::list_words))
        .route("/data/summary", get(data::data_summary))
        .route("/data/insights", post(data::generate_insights))
        .route("/dataset/:name", get(data::get_dataset))
        .fallback(api_not_found)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Endpoint '{}' not found", uri.path()))
}

/// Unknown paths get `index.html` so client-side routes survive a reload.
fn static_bundle(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

async fn banner() -> Json<Value> {
    Json(json!({
        "service": "tiktok-insights",
        "version": env!("CARGO_PKG_VERSION"),
        "api": "/api",
    }))
}
