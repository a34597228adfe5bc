use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::ChatMessage;
use crate::errors::SessionResult;

/// Where a conversation survives between runs.
pub trait SessionStorage: Send + Sync {
    /// `None` when nothing usable is stored.
    fn load(&self) -> SessionResult<Option<Vec<ChatMessage>>>;

    fn save(&self, messages: &[ChatMessage]) -> SessionResult<()>;

    fn clear(&self) -> SessionResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    messages: Mutex<Option<Vec<ChatMessage>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Vec<ChatMessage>>> {
        // a poisoned lock still holds a valid Vec
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> SessionResult<Option<Vec<ChatMessage>>> {
        Ok(self.slot().clone())
    }

    fn save(&self, messages: &[ChatMessage]) -> SessionResult<()> {
        *self.slot() = Some(messages.to_vec());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// History kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> SessionResult<Option<Vec<ChatMessage>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&content) {
            Ok(messages) => Ok(Some(messages)),
            Err(err) => {
                warn!(
                    "Discarding unreadable chat history {}: {}",
                    self.path.display(),
                    err
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, messages: &[ChatMessage]) -> SessionResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(messages)?)?;
        debug!("Saved {} messages to {}", messages.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Sender;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_roundtrip_and_clear() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("chat.json"));
        assert_eq!(storage.load().unwrap(), None);

        let messages = vec![ChatMessage::new(Sender::User, "hola")];
        storage.save(&messages).unwrap();
        assert_eq!(storage.load().unwrap(), Some(messages));

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.load().unwrap(), None);
        assert!(!path.exists());
    }
}
