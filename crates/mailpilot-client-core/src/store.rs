use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The locally persisted identity. At most one exists at a time; its
/// presence is the sole gate between the login view and the status view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("session_store_io:{message}")]
    Io { message: String },
    #[error("session_store_decode:{message}")]
    Decode { message: String },
}

impl StoreError {
    fn io(error: &std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

/// Durability layer for the single local session. No business logic; all
/// operations are atomic from the caller's perspective.
#[async_trait]
pub trait SessionStore {
    async fn load(&self) -> Result<Option<Session>, StoreError>;
    async fn save(&self, session: &Session) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Single-file JSON store. Writes go to a sibling temp file first and are
/// renamed into place so a partial write is never observable.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(StoreError::io(&error)),
        };
        let session = serde_json::from_slice(&bytes).map_err(|error| StoreError::Decode {
            message: error.to_string(),
        })?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| StoreError::io(&error))?;
        }
        let payload = serde_json::to_vec_pretty(session).map_err(|error| StoreError::Decode {
            message: error.to_string(),
        })?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, payload)
            .await
            .map_err(|error| StoreError::io(&error))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|error| StoreError::io(&error))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StoreError::io(&error)),
        }
    }
}

/// In-memory store used by tests and embedders that do not want disk state.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot().clone())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path().join("session.json"))
    }

    #[tokio::test]
    async fn file_store_round_trips_a_session() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);

        let session = Session {
            email: "sam@example.com".to_string(),
        };
        store.save(&session).await.expect("save session");

        let loaded = store.load().await.expect("load session");
        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn file_store_load_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        assert_eq!(store.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);

        store.clear().await.expect("clear on missing file");

        store
            .save(&Session {
                email: "sam@example.com".to_string(),
            })
            .await
            .expect("save session");
        store.clear().await.expect("clear existing file");
        store.clear().await.expect("clear again");
        assert_eq!(store.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn file_store_save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileSessionStore::new(dir.path().join("nested/state/session.json"));

        store
            .save(&Session {
                email: "sam@example.com".to_string(),
            })
            .await
            .expect("save session");
        assert!(store.load().await.expect("load").is_some());
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_payloads() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"not json")
            .await
            .expect("write corrupt file");

        let store = FileSessionStore::new(path);
        let error = store.load().await.expect_err("expected decode error");
        assert!(matches!(error, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn memory_store_round_trips_and_clears() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().await.expect("load"), None);

        let session = Session {
            email: "sam@example.com".to_string(),
        };
        store.save(&session).await.expect("save");
        assert_eq!(store.load().await.expect("load"), Some(session));

        store.clear().await.expect("clear");
        assert_eq!(store.load().await.expect("load"), None);
    }
}
