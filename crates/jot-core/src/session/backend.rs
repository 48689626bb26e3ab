//! Durable backends behind the session store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use keyring::Entry;

use super::{SessionEntries, StoreError, StoreResult};

const KEYRING_SERVICE_NAME: &str = "jot";
const KEYRING_SESSION_USERNAME: &str = "session";

/// Durable storage for the whole session map.
///
/// Implementations are synchronous; the store runs them off the async
/// executor. `persist` replaces everything previously stored.
pub trait SessionBackend: Send + Sync + 'static {
    fn load(&self) -> StoreResult<SessionEntries>;
    fn persist(&self, entries: &SessionEntries) -> StoreResult<()>;
}

/// JSON file backend, written atomically via a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> StoreResult<SessionEntries> {
        if !self.path.exists() {
            return Ok(SessionEntries::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(SessionEntries::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(&self, entries: &SessionEntries) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(entries)?;
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, serialized)?;
        restrict_permissions(&temp_path)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> StoreResult<()> {
    Ok(())
}

/// OS keyring backend holding the session map as one JSON secret.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service_name: String,
    username: String,
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self {
            service_name: KEYRING_SERVICE_NAME.to_string(),
            username: KEYRING_SESSION_USERNAME.to_string(),
        }
    }
}

impl KeyringBackend {
    pub fn with_names(service_name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            username: username.into(),
        }
    }

    fn entry(&self) -> StoreResult<Entry> {
        Entry::new(&self.service_name, &self.username)
            .map_err(|error| StoreError::SecureStorage(error.to_string()))
    }
}

impl SessionBackend for KeyringBackend {
    fn load(&self) -> StoreResult<SessionEntries> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(keyring::Error::NoEntry) => Ok(SessionEntries::new()),
            Err(error) => Err(StoreError::SecureStorage(error.to_string())),
        }
    }

    fn persist(&self, entries: &SessionEntries) -> StoreResult<()> {
        let entry = self.entry()?;
        if entries.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(error) => Err(StoreError::SecureStorage(error.to_string())),
            };
        }
        let serialized = serde_json::to_string(entries)?;
        entry
            .set_password(&serialized)
            .map_err(|error| StoreError::SecureStorage(error.to_string()))?;

        // A credential store without persistence accepts writes it cannot
        // hand back to a new entry; treat that as a failed write.
        let stored = self.load()?;
        if &stored != entries {
            return Err(StoreError::SecureStorage(
                "keyring did not retain the session; no persistent credential store is available"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Process-local backend; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<SessionEntries>,
}

impl MemoryBackend {
    pub fn with_entries(entries: SessionEntries) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// What a fresh process would load right now.
    pub fn persisted(&self) -> SessionEntries {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> StoreResult<SessionEntries> {
        Ok(self.persisted())
    }

    fn persist(&self, entries: &SessionEntries) -> StoreResult<()> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("session.json"));
        assert!(backend.load().unwrap().is_empty());

        let mut entries = SessionEntries::new();
        entries.insert("token".to_string(), "tok123".to_string());
        backend.persist(&entries).unwrap();

        assert_eq!(backend.load().unwrap(), entries);
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn file_backend_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = FileBackend::new(path).load().unwrap_err();
        assert!(matches!(error, StoreError::Serialization(_)));
    }

    fn scratch_keyring(test_name: &str) -> KeyringBackend {
        KeyringBackend::with_names(
            "jot-test",
            format!("{test_name}-{}", std::process::id()),
        )
    }

    fn sample_entries() -> SessionEntries {
        let mut entries = SessionEntries::new();
        entries.insert("token".to_string(), "tok123".to_string());
        entries.insert("server_url".to_string(), "https://memos.example.com".to_string());
        entries
    }

    #[test]
    fn keyring_write_is_either_stored_or_rejected() {
        let backend = scratch_keyring("stored-or-rejected");
        let entries = sample_entries();

        match backend.persist(&entries) {
            Ok(()) => {
                let reopened = scratch_keyring("stored-or-rejected");
                assert_eq!(reopened.load().unwrap(), entries);
                backend.persist(&SessionEntries::new()).unwrap();
            }
            Err(error) => assert!(matches!(error, StoreError::SecureStorage(_))),
        }
    }

    #[test]
    #[ignore = "requires an OS credential store"]
    fn keyring_backend_roundtrip_across_instances() {
        let entries = sample_entries();
        scratch_keyring("roundtrip").persist(&entries).unwrap();

        let reopened = scratch_keyring("roundtrip");
        assert_eq!(reopened.load().unwrap(), entries);

        reopened.persist(&SessionEntries::new()).unwrap();
        assert!(scratch_keyring("roundtrip").load().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn file_backend_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("session.json"));
        backend.persist(&SessionEntries::new()).unwrap();

        let mode = std::fs::metadata(backend.path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
