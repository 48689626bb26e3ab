//! Error types for jot-core

use std::fmt;

use thiserror::Error;

use crate::session::StoreError;

/// Result type alias for API and repository operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Remote operations exposed by the memo service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SignIn,
    SignOut,
    CurrentUser,
    ListUsers,
    ListNotes,
    GetNote,
    CreateNote,
    UpdateNote,
    DeleteNote,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign in",
            Self::SignOut => "sign out",
            Self::CurrentUser => "get current user",
            Self::ListUsers => "list users",
            Self::ListNotes => "list notes",
            Self::GetNote => "get note",
            Self::CreateNote => "create note",
            Self::UpdateNote => "update note",
            Self::DeleteNote => "delete note",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the transport and repository layers
#[derive(Error, Debug)]
pub enum ApiError {
    /// No server URL configured, or the HTTP client could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection refused, DNS failure, or a broken connection
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Connect, read, or overall request deadline exceeded
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Well-formed non-2xx response
    #[error("Failed to {operation}: HTTP {status} ({message})")]
    Http {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// 2xx response without the body the operation requires
    #[error("Failed to {operation}: server returned an empty response")]
    EmptyBody { operation: Operation },

    /// Rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local session storage failed
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// HTTP status code for `Http` failures.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else if error.is_builder() {
            Self::Configuration(error.to_string())
        } else {
            Self::Network(error)
        }
    }
}
