//! Local session persistence: token, server URL, and last username.
//!
//! Reads are served from an in-memory mirror and never block on I/O. Writes
//! go through the durable backend first; the mirror only changes once the
//! backend has accepted the new state.

mod backend;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::Mutex;

pub use backend::{FileBackend, KeyringBackend, MemoryBackend, SessionBackend};

/// Persisted key/value map
pub type SessionEntries = BTreeMap<String, String>;

pub const KEY_TOKEN: &str = "token";
pub const KEY_SERVER_URL: &str = "server_url";
pub const KEY_USERNAME: &str = "username";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Point-in-time view of the non-secret session fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub server_url: String,
    pub username: String,
    pub logged_in: bool,
}

pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    mirror: RwLock<SessionEntries>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionStore")
            .field("token", &"[REDACTED]")
            .field("server_url", &self.server_url())
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Load persisted state from `backend` and mirror it in memory.
    pub fn open(backend: impl SessionBackend) -> StoreResult<Self> {
        let backend: Arc<dyn SessionBackend> = Arc::new(backend);
        let entries = backend.load()?;
        Ok(Self {
            backend,
            mirror: RwLock::new(entries),
            write_lock: Mutex::new(()),
        })
    }

    /// Ephemeral store, starting empty.
    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::default()),
            mirror: RwLock::new(SessionEntries::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Value for `key`, or an empty string when absent.
    pub fn get(&self, key: &str) -> String {
        self.read_mirror().get(key).cloned().unwrap_or_default()
    }

    pub fn token(&self) -> String {
        self.get(KEY_TOKEN)
    }

    pub fn server_url(&self) -> String {
        self.get(KEY_SERVER_URL)
    }

    pub fn username(&self) -> String {
        self.get(KEY_USERNAME)
    }

    pub fn is_logged_in(&self) -> bool {
        let entries = self.read_mirror();
        let has = |key: &str| entries.get(key).is_some_and(|value| !value.is_empty());
        has(KEY_TOKEN) && has(KEY_SERVER_URL)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            server_url: self.server_url(),
            username: self.username(),
            logged_in: self.is_logged_in(),
        }
    }

    /// Durably store `value` under `key`. An empty value removes the key.
    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_many(&[(key, value)]).await
    }

    /// Durably store several keys in a single backend write.
    pub async fn set_many(&self, pairs: &[(&str, &str)]) -> StoreResult<()> {
        self.commit(|entries| {
            for (key, value) in pairs {
                if value.is_empty() {
                    entries.remove(*key);
                } else {
                    entries.insert((*key).to_string(), (*value).to_string());
                }
            }
        })
        .await
    }

    pub async fn clear(&self, key: &str) -> StoreResult<()> {
        self.commit(|entries| {
            entries.remove(key);
        })
        .await
    }

    /// Remove every key. Readers see either the old state or the empty one.
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.commit(SessionEntries::clear).await
    }

    async fn commit(&self, change: impl FnOnce(&mut SessionEntries)) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.read_mirror().clone();
        change(&mut next);

        let backend = Arc::clone(&self.backend);
        let snapshot = next.clone();
        tokio::task::spawn_blocking(move || backend.persist(&snapshot))
            .await
            .map_err(|error| StoreError::Io(std::io::Error::other(error)))??;

        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn read_mirror(&self) -> std::sync::RwLockReadGuard<'_, SessionEntries> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct FailingBackend;

    impl SessionBackend for FailingBackend {
        fn load(&self) -> StoreResult<SessionEntries> {
            Ok(SessionEntries::new())
        }

        fn persist(&self, _entries: &SessionEntries) -> StoreResult<()> {
            Err(StoreError::SecureStorage("backend offline".to_string()))
        }
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get("anything"), "");
        assert_eq!(store.token(), "");
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn logged_in_requires_token_and_server_url() {
        let store = SessionStore::in_memory();
        store.set(KEY_TOKEN, "tok").await.unwrap();
        assert!(!store.is_logged_in());

        store
            .set(KEY_SERVER_URL, "https://demo.example.com")
            .await
            .unwrap();
        assert!(store.is_logged_in());

        store.clear(KEY_TOKEN).await.unwrap();
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn empty_value_removes_key() {
        let store = SessionStore::in_memory();
        store.set(KEY_USERNAME, "alice").await.unwrap();
        store.set(KEY_USERNAME, "").await.unwrap();
        assert_eq!(store.username(), "");
    }

    #[tokio::test]
    async fn writes_are_durable_before_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::open(FileBackend::new(&path)).unwrap();

        store
            .set_many(&[(KEY_TOKEN, "tok123"), (KEY_USERNAME, "alice")])
            .await
            .unwrap();

        let reopened = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert_eq!(reopened.token(), "tok123");
        assert_eq!(reopened.username(), "alice");
    }

    #[tokio::test]
    async fn clear_all_removes_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::open(FileBackend::new(&path)).unwrap();
        store
            .set_many(&[
                (KEY_TOKEN, "tok"),
                (KEY_SERVER_URL, "https://demo.example.com"),
                (KEY_USERNAME, "alice"),
            ])
            .await
            .unwrap();

        store.clear_all().await.unwrap();

        assert_eq!(
            store.snapshot(),
            SessionSnapshot {
                server_url: String::new(),
                username: String::new(),
                logged_in: false,
            }
        );
        let reopened = SessionStore::open(FileBackend::new(&path)).unwrap();
        assert_eq!(reopened.server_url(), "");
    }

    #[tokio::test]
    async fn failed_persist_leaves_mirror_untouched() {
        let store = SessionStore::open(FailingBackend).unwrap();
        let error = store.set(KEY_TOKEN, "tok").await.unwrap_err();
        assert!(matches!(error, StoreError::SecureStorage(_)));
        assert_eq!(store.token(), "");
    }

    #[test]
    fn debug_redacts_token() {
        let mut entries = SessionEntries::new();
        entries.insert(KEY_TOKEN.to_string(), "secret-token".to_string());
        let store = SessionStore::open(MemoryBackend::with_entries(entries)).unwrap();
        assert!(!format!("{store:?}").contains("secret-token"));
    }
}
