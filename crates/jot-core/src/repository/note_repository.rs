//! CRUD over memos with a uniform `ApiResult`.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::models::{Note, NoteDraft, NoteFilter, NoteId, NotePatch, RowStatus};

#[derive(Debug, Clone)]
pub struct NoteRepository {
    api: Arc<ApiClient>,
}

impl NoteRepository {
    pub const fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_notes(&self, filter: &NoteFilter) -> ApiResult<Vec<Note>> {
        self.api.list_notes(filter).await?.into_body()
    }

    pub async fn get_note(&self, id: NoteId) -> ApiResult<Note> {
        self.api.get_note(id).await?.into_body()
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> ApiResult<Note> {
        let note = self.api.create_note(draft).await?.into_body()?;
        tracing::debug!(note_id = %note.id, "Created note");
        Ok(note)
    }

    pub async fn update_note(&self, id: NoteId, patch: &NotePatch) -> ApiResult<Note> {
        self.api.update_note(id, patch).await?.into_body()
    }

    /// Delete a memo. Any 2xx counts as success, with or without a body.
    pub async fn delete_note(&self, id: NoteId) -> ApiResult<()> {
        self.api.delete_note(id).await?.into_optional_body()?;
        tracing::debug!(note_id = %id, "Deleted note");
        Ok(())
    }

    pub async fn set_pinned(&self, id: NoteId, pinned: bool) -> ApiResult<Note> {
        let patch = NotePatch {
            pinned: Some(pinned),
            ..NotePatch::default()
        };
        self.update_note(id, &patch).await
    }

    pub async fn archive_note(&self, id: NoteId) -> ApiResult<Note> {
        self.set_row_status(id, RowStatus::Archived).await
    }

    pub async fn restore_note(&self, id: NoteId) -> ApiResult<Note> {
        self.set_row_status(id, RowStatus::Normal).await
    }

    async fn set_row_status(&self, id: NoteId, row_status: RowStatus) -> ApiResult<Note> {
        let patch = NotePatch {
            row_status: Some(row_status),
            ..NotePatch::default()
        };
        self.update_note(id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ApiError, Operation};
    use crate::models::Visibility;
    use crate::test_support::{client_for, note_json, refused_url, StubResponse, StubServer};

    #[tokio::test]
    async fn create_note_returns_echoed_note() {
        let server =
            StubServer::spawn(vec![StubResponse::json("201 Created", &note_json(1, "hello"))]).await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        let draft = NoteDraft::new("hello").with_visibility(Visibility::Private);
        let note = repository.create_note(&draft).await.unwrap();

        assert_eq!(note.content, "hello");
        assert_eq!(note.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn create_note_without_body_is_empty_body_error() {
        let server = StubServer::spawn(vec![StubResponse::empty("201 Created")]).await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        let error = repository
            .create_note(&NoteDraft::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ApiError::EmptyBody {
                operation: Operation::CreateNote
            }
        ));
    }

    #[tokio::test]
    async fn get_missing_note_is_http_404() {
        let server = StubServer::spawn(vec![StubResponse::json(
            "404 Not Found",
            r#"{"error":"memo not found"}"#,
        )])
        .await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        let error = repository.get_note(NoteId(42)).await.unwrap_err();

        assert!(matches!(
            error,
            ApiError::Http {
                operation: Operation::GetNote,
                status: 404,
                ..
            }
        ));
        let message = error.to_string();
        assert!(message.contains("get note"));
        assert!(message.contains("404"));
        assert_eq!(server.only_request().path(), "/api/v1/memos/42");
    }

    #[tokio::test]
    async fn delete_with_connection_error_is_network_error() {
        let api = client_for(&refused_url(), "tok").await;
        let repository = NoteRepository::new(Arc::clone(&api));

        let error = repository.delete_note(NoteId(7)).await.unwrap_err();

        assert!(matches!(error, ApiError::Network(_)));
        assert_eq!(api.session().token(), "tok");
        assert!(api.session().is_logged_in());
    }

    #[tokio::test]
    async fn delete_accepts_empty_success() {
        let server = StubServer::spawn(vec![StubResponse::empty("204 No Content")]).await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        repository.delete_note(NoteId(7)).await.unwrap();
        assert_eq!(server.only_request().method, "DELETE");
    }

    #[tokio::test]
    async fn list_notes_decodes_every_note() {
        let body = format!("[{},{}]", note_json(1, "one"), note_json(2, "two #tag"));
        let server = StubServer::spawn(vec![StubResponse::json("200 OK", &body)]).await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        let notes = repository.list_notes(&NoteFilter::default()).await.unwrap();

        assert_eq!(
            notes.iter().map(|note| note.id).collect::<Vec<_>>(),
            vec![NoteId(1), NoteId(2)]
        );
        assert_eq!(notes[1].tags(), vec!["tag".to_string()]);
    }

    #[tokio::test]
    async fn archive_and_pin_send_partial_patches() {
        let server = StubServer::spawn(vec![
            StubResponse::json("200 OK", &note_json(3, "x")),
            StubResponse::json("200 OK", &note_json(3, "x")),
            StubResponse::json("200 OK", &note_json(3, "x")),
        ])
        .await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        repository.archive_note(NoteId(3)).await.unwrap();
        repository.restore_note(NoteId(3)).await.unwrap();
        repository.set_pinned(NoteId(3), false).await.unwrap();

        let bodies = server
            .requests()
            .iter()
            .map(crate::test_support::RecordedRequest::json_body)
            .collect::<Vec<_>>();
        assert_eq!(
            bodies,
            vec![
                serde_json::json!({"rowStatus": "ARCHIVED"}),
                serde_json::json!({"rowStatus": "NORMAL"}),
                serde_json::json!({"pinned": false}),
            ]
        );
    }

    #[tokio::test]
    async fn update_failure_names_operation() {
        let server = StubServer::spawn(vec![StubResponse::empty("500 Internal Server Error")]).await;
        let repository = NoteRepository::new(client_for(&server.base_url, "tok").await);

        let error = repository
            .update_note(NoteId(3), &NotePatch::default())
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Failed to update note: HTTP 500 (Internal Server Error)"
        );
    }
}
