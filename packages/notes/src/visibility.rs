//! # Visibility: is a fetched note readable?
//!
//! [`resolve`] fetches one note and classifies it:
//!
//! | Outcome | When |
//! |---------|------|
//! | [`Visibility::Unlocked`] | Not encrypted, or the service decrypted it with the supplied password |
//! | [`Visibility::Locked`] | Encrypted, no password supplied, content is the placeholder |
//! | [`Visibility::WrongPassword`] | A password was supplied but the note is still locked, or the service refused it with a 400 |
//! | [`Visibility::NotFound`] | The service answered 404 |
//!
//! Everything else is a [`ResolveError`]: transport and server failures are
//! retryable; rejected requests and malformed responses are not. The call is a plain read and safe
//! to repeat.

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{DecryptionPassword, Note, UnlockedNote};
use crate::store::{NoteStore, StoreError};

/// How a note looks to the client after one fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum Visibility {
    /// Encrypted and no password given. The note carries title and metadata only.
    Locked(Note),
    Unlocked(UnlockedNote),
    NotFound,
    /// Re-prompt; this is not a system fault.
    WrongPassword { detail: Option<String> },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("note id is empty")]
    EmptyId,

    #[error("session is no longer valid")]
    Unauthorized,

    #[error("failed to load note: {0}")]
    Fetch(StoreError),

    #[error("unexpected response from the note service: {0}")]
    Protocol(String),
}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::Fetch(err) if err.is_retryable())
    }
}

/// Fetch `note_id` and decide whether its content is readable.
pub async fn resolve<S: NoteStore>(
    store: &S,
    note_id: &str,
    password: Option<&DecryptionPassword>,
) -> Result<Visibility, ResolveError> {
    let note_id = note_id.trim();
    if note_id.is_empty() {
        return Err(ResolveError::EmptyId);
    }
    debug!(note_id, with_password = password.is_some(), "resolving note");

    let note = match store.fetch_note(note_id, password).await {
        Ok(note) => note,
        Err(StoreError::NotFound) => return Ok(Visibility::NotFound),
        Err(StoreError::Unauthorized) => return Err(ResolveError::Unauthorized),
        Err(StoreError::Rejected { status: 400, detail }) if password.is_some() => {
            return Ok(Visibility::WrongPassword {
                detail: Some(detail),
            });
        }
        Err(StoreError::Protocol(msg)) => {
            warn!(note_id, "malformed note response: {msg}");
            return Err(ResolveError::Protocol(msg));
        }
        Err(err) => return Err(ResolveError::Fetch(err)),
    };

    if note.is_locked() {
        return Ok(match password {
            Some(_) => Visibility::WrongPassword { detail: None },
            None => Visibility::Locked(note),
        });
    }

    // A decrypted note is paired with the password that opened it.
    let used = if note.is_encrypted {
        password.cloned()
    } else {
        None
    };
    match UnlockedNote::new(note, used) {
        Some(unlocked) => Ok(Visibility::Unlocked(unlocked)),
        None => Err(ResolveError::Protocol(
            "unlocked note still carries the locked placeholder".to_string(),
        )),
    }
}
