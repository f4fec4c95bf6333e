//! # Password lifecycle for one note view
//!
//! [`PasswordKeeper`] remembers the password that last unlocked the note on
//! screen so the edit flow does not ask for it again. It holds at most one
//! password, for exactly one note id, and is dropped with the view.
//!
//! [`EditHandoff`] carries the password into the edit page. When the edit page
//! is reached through a link the password travels in the `password` query
//! parameter, which puts it in browser history and possibly referrer headers.
//! That is a deliberate convenience tradeoff kept as-is pending product
//! sign-off; it is not a security guarantee.
//!
//! The router percent-decodes the whole query string before splitting it on
//! `&`, so a password encoded once would be cut at its first `&` or `=`
//! sequence. [`EditHandoff::edit_path`] encodes the value twice and
//! [`handoff_password`] undoes the second layer on arrival.

use thiserror::Error;
use tracing::debug;

use crate::models::{DecryptionPassword, UnlockedNote};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Only notes decrypted with a password can be remembered.
    #[error("note {0} was not unlocked with a password")]
    NotPasswordProtected(String),

    /// Another note's password is held; `forget` first.
    #[error("a password for note {held} is still remembered")]
    OtherNoteHeld { held: String },
}

#[derive(Debug, Default)]
pub struct PasswordKeeper {
    held: Option<(String, DecryptionPassword)>,
}

impl PasswordKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the password that unlocked `unlocked`, replacing any earlier
    /// password for the same note.
    pub fn remember(&mut self, unlocked: &UnlockedNote) -> Result<(), PasswordError> {
        let password = unlocked
            .decryption_password()
            .ok_or_else(|| PasswordError::NotPasswordProtected(unlocked.id().to_string()))?;
        if let Some((held, _)) = &self.held {
            if held != unlocked.id() {
                return Err(PasswordError::OtherNoteHeld { held: held.clone() });
            }
        }
        debug!(note_id = unlocked.id(), "remembering unlock password");
        self.held = Some((unlocked.id().to_string(), password.clone()));
        Ok(())
    }

    pub fn forget(&mut self) {
        if let Some((note_id, _)) = self.held.take() {
            debug!(note_id, "forgetting unlock password");
        }
    }

    /// The remembered password, only if it belongs to `note_id`.
    pub fn password_for(&self, note_id: &str) -> Option<&DecryptionPassword> {
        match &self.held {
            Some((held, password)) if held == note_id => Some(password),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }

    pub fn handoff_to_edit(&self, note_id: &str) -> Option<EditHandoff> {
        self.password_for(note_id).map(|password| EditHandoff {
            note_id: note_id.to_string(),
            password: password.clone(),
        })
    }
}

/// The remembered password on its way into the edit flow.
#[derive(Clone, Debug, PartialEq)]
pub struct EditHandoff {
    note_id: String,
    password: DecryptionPassword,
}

impl EditHandoff {
    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    /// Pre-fills the edit form's password field.
    pub fn password(&self) -> &DecryptionPassword {
        &self.password
    }

    /// Link to the edit page with the password as a query parameter.
    pub fn edit_path(&self) -> String {
        let once = urlencoding::encode(self.password.expose());
        format!(
            "{}?password={}",
            edit_path(&self.note_id),
            urlencoding::encode(&once)
        )
    }
}

/// The password from the edit page's `password` parameter, as the router hands
/// it over. `None` when absent, blank or not valid UTF-8.
pub fn handoff_password(query_value: &str) -> Option<DecryptionPassword> {
    let decoded = urlencoding::decode(query_value).ok()?;
    DecryptionPassword::parse(&decoded)
}

/// Link to the edit page without a password.
pub fn edit_path(note_id: &str) -> String {
    format!("/notes/{}/edit", urlencoding::encode(note_id))
}
