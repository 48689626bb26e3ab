//! Caller-facing repositories.
//!
//! Every operation issues at most one transport call and completes exactly
//! once with an [`ApiResult`](crate::error::ApiResult).

mod note_repository;
mod session_repository;

pub use note_repository::NoteRepository;
pub use session_repository::SessionRepository;
