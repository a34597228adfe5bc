//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use tempfile::TempDir;
use tiktok_insights::config::AppConfig;
use tiktok_insights::corpus::Corpus;
use tiktok_insights::errors::{LlmError, LlmResult};
use tiktok_insights::llm::{BackendStatus, GenerateRequest, LlmProvider, ModelInfo, PromptLibrary};
use tiktok_insights::relevance::KeywordRanker;
use tiktok_insights::server::{create_app, AppState};

pub const CREATORS_CSV: &str = "\
username,followers,age,perspective,themes
ana_politica,56.1K,18-24,izquierda,feminismo;educación
bruno_news,1.2M,25-34,periodista,noticias
carla_d,3K,35-44,derecha,economía
";

pub const VIDEOS_CSV: &str = "\
username,title,views,url,date
ana_politica,Marcha por la educación,12000,https://tiktok.com/@ana/1,2024-03-01
ana_politica,Justicia para todas,8000,https://tiktok.com/@ana/2,2024-04-12
bruno_news,Resumen semanal,450000,https://tiktok.com/@bruno/1,2024-04-20
carla_d,Impuestos y libertad,3000,https://tiktok.com/@carla/1,2024-05-02
";

pub const WORDS_CSV: &str = "\
word,count,sentimiento,type_1,type_2
justicia,10,1,valores,política
libertad,8,1,valores,política
libro,3,0,cultura,Sin clasificar
corrupción,6,-1,política,Sin clasificar
liberal,2,0,política,ideología
";

pub const SUBTITLES_CSV: &str = "\
username,url,subtitles
ana_politica,https://tiktok.com/@ana/2,queremos justicia y libertad
carla_d,https://tiktok.com/@carla/1,basta de corrupción
";

/// Writes the four corpus files into a fresh directory.
pub fn corpus_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write_corpus(dir.path());
    dir
}

pub fn write_corpus(dir: &Path) {
    for (name, content) in [
        ("cuentas_info.csv", CREATORS_CSV),
        ("combined_tiktok_data_cleaned_with_date.csv", VIDEOS_CSV),
        ("data.csv", WORDS_CSV),
        ("subtitulos_videos_v3.csv", SUBTITLES_CSV),
    ] {
        std::fs::write(dir.join(name), content).expect("write fixture");
    }
}

/// Language model double: answers every prompt with `reply`, or fails as an
/// unreachable backend when `reply` is `None`.
pub struct FakeLlm {
    pub reply: Option<String>,
    pub prompts: Mutex<Vec<GenerateRequest>>,
}

impl FakeLlm {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn offline() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, request: &GenerateRequest) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| LlmError::Unreachable("no candidate answered".to_string()))
    }

    async fn list_models(&self) -> LlmResult<Vec<ModelInfo>> {
        match self.reply {
            Some(_) => Ok(vec![ModelInfo {
                name: "qwen3:4b".to_string(),
                model: "qwen3:4b".to_string(),
            }]),
            None => Err(LlmError::Unreachable("no candidate answered".to_string())),
        }
    }

    async fn status(&self) -> LlmResult<BackendStatus> {
        match self.reply {
            Some(_) => Ok(BackendStatus {
                status: "available".to_string(),
                base_url: "http://fake:11434".to_string(),
                models: vec!["qwen3:4b".to_string()],
            }),
            None => Err(LlmError::Unreachable("no candidate answered".to_string())),
        }
    }
}

pub fn state(data_dir: &Path, llm: Arc<dyn LlmProvider>, config: AppConfig) -> AppState {
    AppState {
        corpus: Arc::new(Corpus::load(data_dir)),
        llm,
        ranker: Arc::new(KeywordRanker::default()),
        prompts: Arc::new(PromptLibrary::new().expect("prompt templates")),
        config: Arc::new(AppConfig {
            data_dir: data_dir.to_path_buf(),
            ..config
        }),
    }
}

pub fn test_server(data_dir: &Path, llm: Arc<dyn LlmProvider>) -> TestServer {
    let app = create_app(state(data_dir, llm, AppConfig::default()), None).expect("app");
    TestServer::new(app).expect("test server")
}
