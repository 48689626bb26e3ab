//! jot-core - Core library for Jot
//!
//! This crate holds the models, persisted session, HTTP transport, and
//! repositories used by every Jot frontend to talk to a self-hosted memos
//! server.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;
pub mod util;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ApiResponse, TransportOptions, UnauthorizedPolicy};
pub use config::{ClientConfig, ConfigError, SessionBackendKind};
pub use error::{ApiError, ApiResult, Operation};
pub use models::{Note, NoteDraft, NoteFilter, NoteId, NotePatch, RowStatus, User, UserId, Visibility};
pub use repository::{NoteRepository, SessionRepository};
pub use services::JotClient;
pub use session::{SessionSnapshot, SessionStore, StoreError};
