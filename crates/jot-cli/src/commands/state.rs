use crate::commands::common::{open_signed_in_client, parse_note_id};
use crate::error::CliError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateChange {
    Pin,
    Unpin,
    Archive,
    Restore,
}

pub async fn run_state_change(id: &str, change: StateChange) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let client = open_signed_in_client()?;
    let notes = client.notes();

    let note = match change {
        StateChange::Pin => notes.set_pinned(note_id, true).await?,
        StateChange::Unpin => notes.set_pinned(note_id, false).await?,
        StateChange::Archive => notes.archive_note(note_id).await?,
        StateChange::Restore => notes.restore_note(note_id).await?,
    };

    println!("{}", note.id);
    Ok(())
}
