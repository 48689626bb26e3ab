use jot_core::NotePatch;

use crate::cli::VisibilityArg;
use crate::commands::common::{
    capture_editor_input_with_initial, normalize_content, open_signed_in_client, parse_note_id,
};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    content: Option<&str>,
    visibility: Option<VisibilityArg>,
) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let client = open_signed_in_client()?;

    let mut patch = NotePatch {
        visibility: visibility.map(Into::into),
        ..NotePatch::default()
    };

    if let Some(content) = content {
        patch.content = Some(normalize_content(content).ok_or(CliError::EmptyEditedContent)?);
    } else if patch.visibility.is_none() {
        let note = client.notes().get_note(note_id).await?;
        let Some(edited_content) = capture_editor_input_with_initial(&note.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        if edited_content == note.content {
            println!("{}", note.id);
            return Ok(());
        }
        patch.content = Some(edited_content);
    }

    let updated = client.notes().update_note(note_id, &patch).await?;
    println!("{}", updated.id);
    Ok(())
}
