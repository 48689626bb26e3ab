//! Wire models for the memo service

mod note;
mod user;

use chrono::{DateTime, Utc};

pub use note::{
    extract_tags, Note, NoteDraft, NoteFilter, NoteId, NotePatch, NoteRelation, Resource,
    RowStatus, Visibility,
};
pub use user::{SignInRequest, SignInResponse, User, UserId};

fn timestamp_to_datetime(unix_seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(unix_seconds, 0)
}
