//! # Note store: the remote collaborator behind every operation
//!
//! [`NoteStore`] is the seam between the client core and whatever actually
//! holds notes: the REST service in production (`api::HttpNoteStore`) or
//! [`crate::MemoryNoteStore`] in tests. Encryption, decryption and sensitivity
//! scoring all happen on the other side of this trait.
//!
//! | Method | Remote operation |
//! |--------|------------------|
//! | `fetch_note` | Read one note, optionally with a decryption password |
//! | `list_notes` | Read a page of the user's notes |
//! | `create_note` | Create from a [`NoteDraft`] |
//! | `update_note` | Partial update from a [`NoteUpdate`] |
//! | `recreate_note` | Server-side create-then-delete; the only way to re-key an encrypted note |
//! | `delete_note` | Remove a note |

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::models::{DecryptionPassword, Note};

/// Failures reported by a [`NoteStore`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("note not found")]
    NotFound,

    #[error("session is no longer valid")]
    Unauthorized,

    #[error("request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Protocol(String),
}

impl StoreError {
    /// Transient failures the user may retry by hand.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Server { .. } | StoreError::Transport(_))
    }

    /// The `detail` text of a rejection, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { detail, .. } | StoreError::Server { detail, .. } => {
                Some(detail)
            }
            _ => None,
        }
    }
}

/// Payload for creating (or recreating) a note.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub is_encrypted: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_password"
    )]
    pub encryption_password: Option<DecryptionPassword>,
}

impl NoteDraft {
    pub fn plain(title: &str, content: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            is_encrypted: false,
            encryption_password: None,
        }
    }

    pub fn encrypted(title: &str, content: &str, password: DecryptionPassword) -> Self {
        Self {
            is_encrypted: true,
            encryption_password: Some(password),
            ..Self::plain(title, content)
        }
    }
}

/// Payload for updating a note in place.
///
/// `encryption_password` is serialized as an explicit `null` when the note is
/// not being encrypted, which is what the service expects.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub is_encrypted: bool,
    #[serde(serialize_with = "serialize_password")]
    pub encryption_password: Option<DecryptionPassword>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_password"
    )]
    pub old_encryption_password: Option<DecryptionPassword>,
}

fn serialize_password<S>(password: &Option<DecryptionPassword>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match password {
        Some(pw) => s.serialize_some(pw.expose()),
        None => s.serialize_none(),
    }
}

/// Pagination window for listing notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    /// Largest page the service accepts.
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 10 }
    }
}

/// Async interface to the note service.
pub trait NoteStore {
    fn fetch_note(
        &self,
        id: &str,
        password: Option<&DecryptionPassword>,
    ) -> impl Future<Output = Result<Note, StoreError>>;

    fn list_notes(&self, page: Page) -> impl Future<Output = Result<Vec<Note>, StoreError>>;

    fn create_note(&self, draft: &NoteDraft) -> impl Future<Output = Result<Note, StoreError>>;

    fn update_note(
        &self,
        id: &str,
        update: &NoteUpdate,
    ) -> impl Future<Output = Result<Note, StoreError>>;

    /// Creates a new note from `draft`, reading the original with
    /// `original_password`, and deletes the original when `delete_original`.
    /// Atomicity is the service's responsibility.
    fn recreate_note(
        &self,
        id: &str,
        draft: &NoteDraft,
        delete_original: bool,
        original_password: Option<&DecryptionPassword>,
    ) -> impl Future<Output = Result<Note, StoreError>>;

    fn delete_note(&self, id: &str) -> impl Future<Output = Result<(), StoreError>>;
}
