//! One-stop client: session store, transport, and repositories built from a
//! single [`ClientConfig`].

use std::sync::Arc;

use crate::api::{ApiClient, TransportOptions};
use crate::config::{ClientConfig, ConfigError};
use crate::repository::{NoteRepository, SessionRepository};
use crate::session::{SessionSnapshot, SessionStore};

/// Cheap to clone; every clone shares the same session and HTTP binding.
#[derive(Debug, Clone)]
pub struct JotClient {
    api: Arc<ApiClient>,
    sessions: SessionRepository,
    notes: NoteRepository,
}

impl JotClient {
    /// Open the configured session backend and build the client over it.
    pub fn open(config: &ClientConfig) -> Result<Self, ConfigError> {
        let store = config.open_session_store()?;
        Ok(Self::with_store(Arc::new(store), config.transport_options()))
    }

    /// Client over a volatile session (primarily for tests).
    pub fn in_memory(options: TransportOptions) -> Self {
        Self::with_store(Arc::new(SessionStore::in_memory()), options)
    }

    pub fn with_store(store: Arc<SessionStore>, options: TransportOptions) -> Self {
        let api = Arc::new(ApiClient::new(store, options));
        Self {
            sessions: SessionRepository::new(Arc::clone(&api)),
            notes: NoteRepository::new(Arc::clone(&api)),
            api,
        }
    }

    pub const fn sessions(&self) -> &SessionRepository {
        &self.sessions
    }

    pub const fn notes(&self) -> &NoteRepository {
        &self.notes
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.sessions.session_snapshot()
    }
}
