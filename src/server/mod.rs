pub mod app;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::corpus::Corpus;
use crate::llm::{OllamaProvider, PromptLibrary};
use crate::relevance::KeywordRanker;

pub use app::{create_app, AppState};
pub use error::ApiError;

/// Loads the corpus and wires the Ollama backend for `config`.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let corpus = Corpus::load(&config.data_dir);
    let llm = OllamaProvider::from_config(&config.llm).context("configuring LLM backend")?;
    let prompts = PromptLibrary::new().context("loading prompt templates")?;

    Ok(AppState {
        corpus: Arc::new(corpus),
        llm: Arc::new(llm),
        ranker: Arc::new(KeywordRanker::default()),
        prompts: Arc::new(prompts),
        config: Arc::new(config.clone()),
    })
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let state = build_state(&config)?;
    info!(
        "Corpus ready: {} records across {} datasets",
        state.corpus.total_records(),
        crate::corpus::DatasetKind::ALL.len()
    );

    let app = create_app(state, config.cors_origin.as_deref())?;

    log_routes(&config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(config: &AppConfig) {
    info!("API Endpoints:");
    info!("  /api/health                 - Health check with dataset counts");
    info!("  /api/status/llm             - Language model reachability");
    info!("  /api/models                 - Installed models");
    info!("  /api/chat                   - Question answering (POST)");
    info!("  /api/visualize              - Chart payloads (POST)");
    info!("  /api/word-suggestions       - Lexicon autocomplete");
    info!("  /api/data/*                 - Listings, summary and insights");
    info!("  /api/dataset/{{name}}         - Raw dataset preview");
    match &config.static_dir {
        Some(dir) => info!("  /*                          - Static bundle from {}", dir.display()),
        None => info!("  /*                          - Service banner"),
    }
}
