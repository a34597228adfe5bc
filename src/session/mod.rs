//! Conversation state for a chat front end.
//!
//! [`ChatStore`] owns the history, send status and model selection. Every
//! change goes through [`reduce`], a pure function of the previous state and a
//! [`ChatAction`]; the store only adds persistence and the call to the
//! [`ChatBackend`].

pub mod storage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DEFAULT_MODEL;
use crate::errors::{SessionError, SessionResult};
use crate::services::{ChatRequest, ChatResponse};
use crate::visualization::VisualizationPayload;

pub use storage::{FileStorage, MemoryStorage, SessionStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    /// Markdown text
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<VisualizationPayload>,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
            visualization: None,
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Sender::Assistant, content)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub status: ChatStatus,
    pub last_error: Option<String>,
    pub available_models: Vec<String>,
    pub selected_model: String,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            status: ChatStatus::Idle,
            last_error: None,
            available_models: Vec::new(),
            selected_model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    Restored(Vec<ChatMessage>),
    SendStarted(ChatMessage),
    ReplyReceived(ChatMessage),
    ReplyFailed { message: ChatMessage, error: String },
    Cleared,
    ModelsLoaded(Vec<String>),
    ModelSelected(String),
}

/// Keeps `current` when it is still offered, else the first available model,
/// else the built-in default.
pub fn resolve_model(current: &str, available: &[String]) -> String {
    if available.iter().any(|m| m == current) {
        current.to_string()
    } else {
        available
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }
}

pub fn reduce(mut state: ChatState, action: ChatAction) -> ChatState {
    match action {
        ChatAction::Restored(messages) => {
            state.messages = messages;
        }
        ChatAction::SendStarted(message) => {
            state.messages.push(message);
            state.status = ChatStatus::Sending;
            state.last_error = None;
        }
        ChatAction::ReplyReceived(message) => {
            state.messages.push(message);
            state.status = ChatStatus::Idle;
        }
        ChatAction::ReplyFailed { message, error } => {
            state.messages.push(message);
            state.status = ChatStatus::Idle;
            state.last_error = Some(error);
        }
        ChatAction::Cleared => {
            state.messages.clear();
            state.last_error = None;
        }
        ChatAction::ModelsLoaded(models) => {
            state.selected_model = resolve_model(&state.selected_model, &models);
            state.available_models = models;
        }
        ChatAction::ModelSelected(model) => {
            state.selected_model = if state.available_models.is_empty() {
                model
            } else {
                resolve_model(&model, &state.available_models)
            };
        }
    }
    state
}

/// Anything that can answer a chat request: the HTTP client, or the
/// in-process service in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub generate_visualization: bool,
    pub visualization_type: Option<String>,
}

pub struct ChatStore<S: SessionStorage> {
    state: ChatState,
    storage: S,
}

impl<S: SessionStorage> ChatStore<S> {
    /// Restores any stored history; unreadable history starts a fresh session.
    pub fn new(storage: S) -> Self {
        let mut store = Self {
            state: ChatState::default(),
            storage,
        };
        match store.storage.load() {
            Ok(Some(messages)) => {
                debug!("Restored {} chat messages", messages.len());
                store.dispatch(ChatAction::Restored(messages));
            }
            Ok(None) => {}
            Err(err) => warn!("Could not restore chat history: {}", err),
        }
        store
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.state.messages
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatch(&mut self, action: ChatAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// History stays in memory when the storage fails; the next save retries.
    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.state.messages) {
            warn!("Could not persist chat history: {}", err);
        }
    }

    /// Sends `query` and records the reply. Backend and storage failures
    /// never leave the store in `Sending`; a failed reply becomes an
    /// error-flagged assistant message rather than an `Err`.
    pub async fn send<B: ChatBackend + ?Sized>(
        &mut self,
        backend: &B,
        query: &str,
        options: SendOptions,
    ) -> SessionResult<ChatMessage> {
        if self.state.status == ChatStatus::Sending {
            return Err(SessionError::Busy);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        self.dispatch(ChatAction::SendStarted(ChatMessage::new(Sender::User, query)));
        self.persist();

        let request = ChatRequest {
            query: query.to_string(),
            generate_visualization: options.generate_visualization,
            visualization_type: options.visualization_type,
            model: Some(self.state.selected_model.clone()),
        };
        let (reply, error) = match backend.chat(&request).await {
            Ok(response) => {
                let mut reply = ChatMessage::new(Sender::Assistant, response.answer);
                reply.visualization = response.visualization;
                (reply, None)
            }
            Err(err) => {
                let error = err.to_string();
                warn!("Chat request failed: {}", error);
                (ChatMessage::error(format!("Error: {}", error)), Some(error))
            }
        };
        let action = match error {
            None => ChatAction::ReplyReceived(reply.clone()),
            Some(error) => ChatAction::ReplyFailed {
                message: reply.clone(),
                error,
            },
        };
        self.dispatch(action);
        self.persist();
        Ok(reply)
    }

    pub fn clear(&mut self) -> SessionResult<()> {
        self.dispatch(ChatAction::Cleared);
        self.storage.clear()?;
        info!("Chat history cleared");
        Ok(())
    }

    pub fn set_models(&mut self, models: Vec<String>) {
        self.dispatch(ChatAction::ModelsLoaded(models));
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.dispatch(ChatAction::ModelSelected(model.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeBackend {
        reply: Result<String, String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl FakeBackend {
        fn new(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(answer) => Ok(ChatResponse {
                    answer: answer.clone(),
                    ..Default::default()
                }),
                Err(error) => Err(anyhow::anyhow!(error.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_send_appends_user_and_assistant() {
        let mut store = ChatStore::new(MemoryStorage::new());
        let backend = FakeBackend::new(Ok("Respuesta"));

        let reply = store.send(&backend, "  hola ", SendOptions::default()).await.unwrap();
        assert_eq!(reply.content, "Respuesta");

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].content, "hola");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].content, "Respuesta");
        assert!(messages[0].timestamp <= messages[1].timestamp);
        assert_eq!(store.state().status, ChatStatus::Idle);
        assert_eq!(store.storage().load().unwrap().unwrap().len(), 2);
        assert_eq!(
            backend.requests.lock().unwrap()[0].model.as_deref(),
            Some(DEFAULT_MODEL)
        );
    }

    #[tokio::test]
    async fn test_error_keeps_history() {
        let storage = MemoryStorage::new();
        storage
            .save(&[ChatMessage::new(Sender::User, "antes")])
            .unwrap();
        let mut store = ChatStore::new(storage);
        let backend = FakeBackend::new(Err("Ollama no está disponible"));

        store.send(&backend, "hola", SendOptions::default()).await.unwrap();

        let messages = store.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "antes");
        assert!(messages[2].is_error);
        assert_eq!(messages[2].sender, Sender::Assistant);
        assert!(messages[2].content.contains("Ollama no está disponible"));
        assert_eq!(store.state().last_error.as_deref(), Some("Ollama no está disponible"));
        assert_eq!(store.state().status, ChatStatus::Idle);
    }

    /// Fails the first `failures` saves, then delegates to memory.
    struct FlakyStorage {
        failures: Mutex<usize>,
        inner: MemoryStorage,
    }

    impl SessionStorage for FlakyStorage {
        fn load(&self) -> SessionResult<Option<Vec<ChatMessage>>> {
            self.inner.load()
        }

        fn save(&self, messages: &[ChatMessage]) -> SessionResult<()> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.save(messages)
        }

        fn clear(&self) -> SessionResult<()> {
            self.inner.clear()
        }
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_wedge_the_store() {
        let mut store = ChatStore::new(FlakyStorage {
            failures: Mutex::new(2),
            inner: MemoryStorage::new(),
        });
        let backend = FakeBackend::new(Ok("Respuesta"));

        let reply = store.send(&backend, "primera", SendOptions::default()).await.unwrap();
        assert_eq!(reply.content, "Respuesta");
        assert_eq!(store.state().status, ChatStatus::Idle);
        assert_eq!(store.messages().len(), 2);
        assert_eq!(store.storage().inner.load().unwrap(), None);

        store.send(&backend, "segunda", SendOptions::default()).await.unwrap();
        assert_eq!(store.state().status, ChatStatus::Idle);
        assert_eq!(store.messages().len(), 4);
        assert_eq!(store.storage().inner.load().unwrap().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_busy_and_empty_are_rejected() {
        let mut store = ChatStore::new(MemoryStorage::new());
        let backend = FakeBackend::new(Ok("x"));

        let err = store.send(&backend, "   ", SendOptions::default()).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyQuery));

        store.dispatch(ChatAction::SendStarted(ChatMessage::new(Sender::User, "en curso")));
        let err = store.send(&backend, "otra", SendOptions::default()).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.save(&[ChatMessage::new(Sender::User, "x")]).unwrap();
        let mut store = ChatStore::new(storage);
        assert_eq!(store.messages().len(), 1);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.messages().is_empty());
        assert_eq!(store.storage().load().unwrap(), None);
    }

    #[test]
    fn test_model_fallback() {
        assert_eq!(resolve_model("llama3", &["llama3".into(), "qwen".into()]), "llama3");
        assert_eq!(resolve_model("gone", &["mistral".into()]), "mistral");
        assert_eq!(resolve_model("gone", &[]), DEFAULT_MODEL);

        let state = reduce(
            ChatState::default(),
            ChatAction::ModelsLoaded(vec!["mistral".into()]),
        );
        assert_eq!(state.selected_model, "mistral");
        let state = reduce(state, ChatAction::ModelSelected("unknown".into()));
        assert_eq!(state.selected_model, "mistral");
    }
}
