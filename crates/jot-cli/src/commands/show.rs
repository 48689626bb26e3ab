use jot_core::Note;

use crate::commands::common::{format_timestamp, open_signed_in_client, parse_note_id};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let client = open_signed_in_client()?;
    let note = client.notes().get_note(note_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("{}", format_note_header(&note));
        println!();
        println!("{}", note.content);
    }
    Ok(())
}

pub fn format_note_header(note: &Note) -> String {
    let mut header = format!(
        "#{}  {}  {}  updated {}",
        note.id,
        note.visibility,
        note.row_status,
        format_timestamp(note.updated_ts)
    );
    if note.pinned {
        header.push_str("  [pinned]");
    }
    if !note.resources.is_empty() {
        header.push_str(&format!("  {} attachment(s)", note.resources.len()));
    }
    header
}
