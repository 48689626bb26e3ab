use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use jot_core::{ClientConfig, JotClient, Note, NoteId, User};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub preview: String,
    pub content: String,
    pub visibility: String,
    pub row_status: String,
    pub pinned: bool,
    pub created_ts: i64,
    pub updated_ts: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub email: Option<String>,
}

/// Open the client described by the config file and `JOT_*` env overrides.
pub fn open_client() -> Result<JotClient, CliError> {
    open_client_from(&ClientConfig::load()?)
}

pub fn open_client_from(config: &ClientConfig) -> Result<JotClient, CliError> {
    tracing::debug!(backend = ?config.session_backend, "Opening client");
    Ok(JotClient::open(config)?)
}

/// Like [`open_client`], but refuses to continue without a stored session.
pub fn open_signed_in_client() -> Result<JotClient, CliError> {
    let client = open_client()?;
    ensure_signed_in(&client)?;
    Ok(client)
}

pub fn ensure_signed_in(client: &JotClient) -> Result<(), CliError> {
    if client.sessions().is_logged_in() {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

pub fn parse_note_id(raw: &str) -> Result<NoteId, CliError> {
    raw.parse::<NoteId>()
        .map_err(|_| CliError::InvalidNoteId(raw.trim().to_string()))
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_secs = Utc::now().timestamp();
    notes
        .iter()
        .map(|note| {
            let id = format!("#{}", note.id);
            let marker = if note.pinned { "*" } else { " " };
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_ts, now_secs);
            let tags = render_tags(note);

            if tags.is_empty() {
                format!("{id:<7}{marker} {preview:<40}  {relative_time}")
            } else {
                format!("{id:<7}{marker} {preview:<40}  {relative_time:<10}  {tags}")
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_secs = Utc::now().timestamp();
    NoteListItem {
        id: note.id.0,
        preview: note_preview(note, 80),
        content: note.content.clone(),
        visibility: note.visibility.to_string(),
        row_status: note.row_status.to_string(),
        pinned: note.pinned,
        created_ts: note.created_ts,
        updated_ts: note.updated_ts,
        relative_time: format_relative_time(note.updated_ts, now_secs),
        tags: note.tags(),
    }
}

pub fn user_to_list_item(user: &User) -> UserListItem {
    UserListItem {
        id: user.id.0,
        username: user.username.clone(),
        display_name: user.label().to_string(),
        role: user.role.clone(),
        email: user.email.clone(),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(note: &Note) -> String {
    note.tags()
        .into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_timestamp(timestamp_secs: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp_secs, 0).map_or_else(
        || timestamp_secs.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_secs: i64, now_secs: i64) -> String {
    let diff = now_secs.saturating_sub(timestamp_secs);
    let minute = 60;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        // EDITOR may carry arguments, e.g. "code --wait"
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("jot-memo-{}-{now}.md", std::process::id()))
}
