use std::io;

use jot_core::{ApiError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Invalid note ID '{0}': expected a number such as 42 or #42")]
    InvalidNoteId(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error(
        "Not signed in. Run `jot login --server <URL> --username <NAME> --password <PASSWORD>` first."
    )]
    NotSignedIn,
}
