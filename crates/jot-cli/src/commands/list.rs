use jot_core::{NoteFilter, UserId};

use crate::cli::{StatusArg, VisibilityArg};
use crate::commands::common::{
    format_note_lines, note_to_list_item, open_signed_in_client, NoteListItem,
};
use crate::error::CliError;

pub fn build_filter(
    creator: Option<i64>,
    status: Option<StatusArg>,
    visibility: Option<VisibilityArg>,
) -> NoteFilter {
    NoteFilter {
        creator_id: creator.map(UserId),
        row_status: status.map(Into::into),
        visibility: visibility.map(Into::into),
    }
}

pub async fn run_list(filter: NoteFilter, as_json: bool) -> Result<(), CliError> {
    let client = open_signed_in_client()?;
    let notes = client.notes().list_notes(&filter).await?;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
