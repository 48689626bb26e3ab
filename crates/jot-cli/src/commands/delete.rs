use crate::commands::common::{open_signed_in_client, parse_note_id};
use crate::error::CliError;

pub async fn run_delete(id: &str) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let client = open_signed_in_client()?;

    client.notes().delete_note(note_id).await?;
    println!("{note_id}");
    Ok(())
}
