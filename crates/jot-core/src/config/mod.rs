//! Client configuration.
//!
//! `ClientConfig` lives in `config.json` under the platform config directory
//! and may be overridden through `JOT_*` environment variables. It controls
//! transport timeouts, where the session is persisted, and the 401 policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{TransportOptions, UnauthorizedPolicy};
use crate::session::{FileBackend, KeyringBackend, SessionStore, StoreError};
use crate::util::normalize_text_option;

const APP_DIR_NAME: &str = "jot";
const CONFIG_FILE_NAME: &str = "config.json";
const SESSION_FILE_NAME: &str = "session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG_PATH: &str = "JOT_CONFIG";
pub const ENV_SESSION_PATH: &str = "JOT_SESSION_PATH";
pub const ENV_SESSION_BACKEND: &str = "JOT_SESSION_BACKEND";
pub const ENV_TIMEOUT_SECS: &str = "JOT_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("Could not resolve a platform {0} directory")]
    NoPlatformDir(&'static str),
    #[error("Failed to open session store: {0}")]
    Session(#[from] StoreError),
}

/// Where the session map is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackendKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::str::FromStr for SessionBackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub session_backend: SessionBackendKind,
    pub session_path: Option<PathBuf>,
    pub on_unauthorized: UnauthorizedPolicy,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_TIMEOUT_SECS,
            write_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_backend: SessionBackendKind::File,
            session_path: None,
            on_unauthorized: UnauthorizedPolicy::Keep,
            user_agent: None,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformDir("config"))
}

pub fn default_session_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(SESSION_FILE_NAME))
        .ok_or(ConfigError::NoPlatformDir("data"))
}

impl ClientConfig {
    /// Load from `$JOT_CONFIG` or the default path, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match normalize_text_option(std::env::var(ENV_CONFIG_PATH).ok()) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        let mut config = Self::load_from_path(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Missing file means defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut normalized = self.clone();
        normalized.normalize();
        let serialized =
            serde_json::to_string_pretty(&normalized).map_err(ConfigError::Serialize)?;
        std::fs::write(path, serialized).map_err(write_error)
    }

    /// Apply `JOT_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let read = |name: &str| normalize_text_option(lookup(name));

        if let Some(path) = read(ENV_SESSION_PATH) {
            self.session_path = Some(PathBuf::from(path));
        }
        if let Some(value) = read(ENV_SESSION_BACKEND) {
            self.session_backend = value.parse().map_err(|value| ConfigError::InvalidEnv {
                name: ENV_SESSION_BACKEND,
                value,
            })?;
        }
        if let Some(value) = read(ENV_TIMEOUT_SECS) {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidEnv {
                    name: ENV_TIMEOUT_SECS,
                    value,
                })?;
            self.connect_timeout_secs = secs;
            self.read_timeout_secs = secs;
            self.write_timeout_secs = secs;
        }
        Ok(())
    }

    pub fn transport_options(&self) -> TransportOptions {
        let defaults = TransportOptions::default();
        TransportOptions {
            connect_timeout: secs_or_default(self.connect_timeout_secs),
            read_timeout: secs_or_default(self.read_timeout_secs),
            write_timeout: secs_or_default(self.write_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            on_unauthorized: self.on_unauthorized,
        }
    }

    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_path {
            Some(path) => Ok(path.clone()),
            None => default_session_path(),
        }
    }

    /// Open the session store this config points at.
    pub fn open_session_store(&self) -> Result<SessionStore, ConfigError> {
        let store = match self.session_backend {
            SessionBackendKind::File => SessionStore::open(FileBackend::new(self.session_path()?))?,
            SessionBackendKind::Keyring => SessionStore::open(KeyringBackend::default())?,
            SessionBackendKind::Memory => SessionStore::in_memory(),
        };
        tracing::debug!(backend = ?self.session_backend, "Opened session store");
        Ok(store)
    }

    fn normalize(&mut self) {
        self.user_agent = normalize_text_option(self.user_agent.take());
        self.session_path = self
            .session_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
    }
}

const fn secs_or_default(secs: u64) -> Duration {
    if secs == 0 {
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    } else {
        Duration::from_secs(secs)
    }
}
