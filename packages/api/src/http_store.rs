//! [`NoteStore`] over the note service's REST endpoints.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | `fetch_note` | `GET /notes/{id}[?decrypt_password=]` |
//! | `list_notes` | `GET /notes?skip=&limit=` |
//! | `create_note` | `POST /notes` |
//! | `update_note` | `PUT /notes/{id}` |
//! | `recreate_note` | `POST /notes/{id}/recreate?delete_original=[&decrypt_password=]` |
//! | `delete_note` | `DELETE /notes/{id}` |

use notes::{DecryptionPassword, Note, NoteDraft, NoteStore, NoteUpdate, Page, StoreError};
use reqwest::Method;
use tracing::debug;

use crate::client::ApiClient;
use crate::wire;

/// Borrows the client, so the token in use is the one the caller holds.
#[derive(Clone, Copy, Debug)]
pub struct HttpNoteStore<'a> {
    client: &'a ApiClient,
}

impl<'a> HttpNoteStore<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

fn note_path(id: &str) -> String {
    format!("/notes/{}", urlencoding::encode(id.trim()))
}

fn trimmed(update: &NoteUpdate) -> NoteUpdate {
    NoteUpdate {
        title: update.title.as_deref().map(|t| t.trim().to_string()),
        content: update.content.as_deref().map(|c| c.trim().to_string()),
        // The service only accepts a new password alongside encryption.
        encryption_password: update
            .encryption_password
            .clone()
            .filter(|_| update.is_encrypted),
        ..update.clone()
    }
}

fn trimmed_draft(draft: &NoteDraft) -> NoteDraft {
    match (draft.is_encrypted, &draft.encryption_password) {
        (true, Some(password)) => {
            NoteDraft::encrypted(&draft.title, &draft.content, password.clone())
        }
        _ => NoteDraft {
            is_encrypted: draft.is_encrypted,
            ..NoteDraft::plain(&draft.title, &draft.content)
        },
    }
}

impl NoteStore for HttpNoteStore<'_> {
    async fn fetch_note(
        &self,
        id: &str,
        password: Option<&DecryptionPassword>,
    ) -> Result<Note, StoreError> {
        let mut request = self.client.request(Method::GET, &note_path(id));
        if let Some(password) = password {
            request = request.query(&[("decrypt_password", password.expose())]);
        }
        debug!(note_id = id, with_password = password.is_some(), "GET note");
        let body = self.client.send(request).await?;
        wire::parse_note(&body)
    }

    async fn list_notes(&self, page: Page) -> Result<Vec<Note>, StoreError> {
        let request = self
            .client
            .request(Method::GET, "/notes")
            .query(&[("skip", page.skip), ("limit", page.limit)]);
        let body = self.client.send(request).await?;
        wire::parse_notes(&body)
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        debug!(encrypted = draft.is_encrypted, "POST note");
        let body = self
            .client
            .send_json(Method::POST, "/notes", &trimmed_draft(draft))
            .await?;
        wire::parse_note(&body)
    }

    async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<Note, StoreError> {
        debug!(note_id = id, encrypted = update.is_encrypted, "PUT note");
        let body = self
            .client
            .send_json(Method::PUT, &note_path(id), &trimmed(update))
            .await?;
        wire::parse_note(&body)
    }

    async fn recreate_note(
        &self,
        id: &str,
        draft: &NoteDraft,
        delete_original: bool,
        original_password: Option<&DecryptionPassword>,
    ) -> Result<Note, StoreError> {
        let path = format!(
            "{}/recreate?delete_original={delete_original}",
            note_path(id)
        );
        let path = match original_password {
            Some(password) => format!(
                "{path}&decrypt_password={}",
                urlencoding::encode(password.expose())
            ),
            None => path,
        };
        debug!(note_id = id, delete_original, "POST recreate");
        let body = self
            .client
            .send_json(Method::POST, &path, &trimmed_draft(draft))
            .await?;
        wire::parse_note(&body)
    }

    async fn delete_note(&self, id: &str) -> Result<(), StoreError> {
        debug!(note_id = id, "DELETE note");
        let request = self.client.request(Method::DELETE, &note_path(id));
        self.client.send(request).await.map(|_| ())
    }
}
