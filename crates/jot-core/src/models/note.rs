//! Note (memo) model

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use super::{timestamp_to_datetime, UserId};

/// Server-assigned memo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().trim_start_matches('#').parse()?))
    }
}

/// Who can read a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Protected => "PROTECTED",
            Self::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soft-delete / archive status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    #[default]
    Normal,
    Archived,
    Deleted,
}

impl RowStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Archived => "ARCHIVED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attachment stored by the memo service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub filename: String,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
    pub created_ts: i64,
    pub updated_ts: i64,
}

/// A typed edge between two memos (e.g. `COMMENT`, `REFERENCE`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRelation {
    pub memo_id: NoteId,
    pub related_memo_id: NoteId,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A memo as returned by the remote service.
///
/// The server owns this record; the client only holds transient copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub uid: String,
    pub row_status: RowStatus,
    pub creator_id: UserId,
    /// Creation timestamp (Unix seconds)
    pub created_ts: i64,
    /// Last update timestamp (Unix seconds)
    pub updated_ts: i64,
    pub content: String,
    pub visibility: Visibility,
    pub pinned: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resources: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relations: Vec<NoteRelation>,
}

impl Note {
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.created_ts)
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.updated_ts)
    }

    /// Extract #tags from content
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        extract_tags(&self.content)
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self.row_status, RowStatus::Archived)
    }
}

/// Extract #tags from text
///
/// Valid tags match `#[a-zA-Z][a-zA-Z0-9_-]*`; they are lowercased,
/// deduplicated, and returned sorted.
///
/// # Examples
///
/// ```
/// use jot_core::models::extract_tags;
///
/// let tags = extract_tags("Plan #Work and #work-log");
/// assert_eq!(tags, vec!["work".to_string(), "work-log".to_string()]);
/// ```
#[must_use]
pub fn extract_tags(text: &str) -> Vec<String> {
    static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = TAG_PATTERN
        .get_or_init(|| Regex::new(r"#([a-zA-Z][a-zA-Z0-9_-]*)").expect("valid tag regex"));

    let mut tags = pattern
        .captures_iter(text)
        .map(|cap| cap[1].to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    tags.sort();
    tags
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a create-note request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    pub content: String,
    pub visibility: Visibility,
    /// Names of previously uploaded resources to attach
    #[serde(rename = "resources", skip_serializing_if = "Option::is_none")]
    pub attachment_refs: Option<Vec<String>>,
}

impl NoteDraft {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visibility: Visibility::default(),
            attachment_refs: None,
        }
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Body of an update-note request; unset fields are left untouched server-side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_status: Option<RowStatus>,
}

impl NotePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.visibility.is_none()
            && self.pinned.is_none()
            && self.row_status.is_none()
    }
}

/// Query filters for listing notes; unset filters are not sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
    /// Server treats an absent status as `NORMAL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_status: Option<RowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl NoteFilter {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.creator_id.is_none() && self.row_status.is_none() && self.visibility.is_none()
    }
}
