use jot_core::NoteDraft;

use crate::cli::VisibilityArg;
use crate::commands::common::{open_signed_in_client, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(content_parts: &[String], visibility: VisibilityArg) -> Result<(), CliError> {
    let client = open_signed_in_client()?;
    let content = resolve_note_content(content_parts)?;

    let draft = NoteDraft::new(content).with_visibility(visibility.into());
    let note = client.notes().create_note(&draft).await?;

    println!("{}", note.id);
    Ok(())
}
