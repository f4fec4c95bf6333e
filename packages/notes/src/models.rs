//! # Domain models for notes
//!
//! [`Note`] mirrors what the note service returns. Its `content` is either
//! plaintext or, for an encrypted note fetched without the right password, a
//! placeholder string starting with [`LOCKED_PREFIX`]. That prefix is the only
//! signal the client has that a note is still locked, so every check goes
//! through [`is_locked_placeholder`].
//!
//! [`UnlockedNote`] is the client-only pairing of a note with the password that
//! opened it. It lives for one view/edit session and is never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved prefix of the server's placeholder for undecrypted content.
pub const LOCKED_PREFIX: &str = "[Encrypted content";

/// Placeholder the service sends for an encrypted note fetched without a password.
pub const LOCKED_CONTENT: &str = "[Encrypted content - Password required to view]";

/// Whether `content` is the server's locked placeholder rather than plaintext.
pub fn is_locked_placeholder(content: &str) -> bool {
    content.starts_with(LOCKED_PREFIX)
}

/// A note as held by the note service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Plaintext, or the locked placeholder.
    pub content: String,
    pub is_encrypted: bool,
    /// Unix seconds.
    pub created_at: f64,
    /// Unix seconds.
    pub updated_at: f64,
    #[serde(default)]
    pub sensitivity: Option<NoteSensitivity>,
}

impl Note {
    /// Encrypted and still carrying the placeholder.
    pub fn is_locked(&self) -> bool {
        self.is_encrypted && is_locked_placeholder(&self.content)
    }

    /// Text used by list search: the title, plus the content of unencrypted notes.
    pub fn searchable_text(&self) -> String {
        if self.is_encrypted {
            self.title.to_lowercase()
        } else {
            format!("{}\n{}", self.title, self.content).to_lowercase()
        }
    }
}

/// Server-computed sensitivity of a note's content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSensitivity {
    /// 0..=100
    pub sensitivity_score: u8,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensitivityLevel {
    Low,
    Medium,
    High,
}

impl NoteSensitivity {
    pub fn level(&self) -> SensitivityLevel {
        match self.sensitivity_score {
            70.. => SensitivityLevel::High,
            40..=69 => SensitivityLevel::Medium,
            _ => SensitivityLevel::Low,
        }
    }
}

impl SensitivityLevel {
    pub fn label(self) -> &'static str {
        match self {
            SensitivityLevel::Low => "Low",
            SensitivityLevel::Medium => "Medium",
            SensitivityLevel::High => "High",
        }
    }
}

/// A user-supplied note password.
///
/// Always non-empty and trimmed. `Debug` is redacted and there is no `Display`,
/// so it cannot end up in a log line by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptionPassword(String);

impl DecryptionPassword {
    /// Trim the input; `None` when nothing is left.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DecryptionPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DecryptionPassword(***)")
    }
}

/// A note whose content is readable, with the password that made it so.
///
/// `decryption_password` is `None` for notes that were never encrypted.
#[derive(Clone, Debug, PartialEq)]
pub struct UnlockedNote {
    note: Note,
    decryption_password: Option<DecryptionPassword>,
}

impl UnlockedNote {
    /// Returns `None` if the content is still the locked placeholder.
    pub fn new(note: Note, decryption_password: Option<DecryptionPassword>) -> Option<Self> {
        if is_locked_placeholder(&note.content) {
            return None;
        }
        Some(Self {
            note,
            decryption_password,
        })
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn id(&self) -> &str {
        &self.note.id
    }

    pub fn content(&self) -> &str {
        &self.note.content
    }

    pub fn decryption_password(&self) -> Option<&DecryptionPassword> {
        self.decryption_password.as_ref()
    }

    /// Drop the plaintext and the password, leaving the note as the service
    /// would return it without a password.
    pub fn relock(self) -> Note {
        let mut note = self.note;
        if note.is_encrypted {
            note.content = LOCKED_CONTENT.to_string();
        }
        note
    }

    pub fn into_note(self) -> Note {
        self.note
    }
}

#[cfg(test)]
pub(crate) fn sample_note(id: &str, content: &str, is_encrypted: bool) -> Note {
    Note {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        title: format!("Note {id}"),
        content: content.to_string(),
        is_encrypted,
        created_at: 1_700_000_000.0,
        updated_at: 1_700_000_000.0,
        sensitivity: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection_uses_prefix() {
        assert!(is_locked_placeholder("[Encrypted content - Password required to view]"));
        assert!(is_locked_placeholder("[Encrypted content"));
        assert!(!is_locked_placeholder("my [Encrypted content] diary"));
        assert!(!is_locked_placeholder(""));
    }

    #[test]
    fn note_is_locked_only_when_encrypted() {
        let placeholder = "[Encrypted content - Password required to view]";
        assert!(sample_note("1", placeholder, true).is_locked());
        assert!(!sample_note("1", placeholder, false).is_locked());
        assert!(!sample_note("1", "hello", true).is_locked());
    }

    #[test]
    fn unlocked_note_rejects_placeholder() {
        let locked = sample_note("1", "[Encrypted content - Decryption failed]", true);
        assert!(UnlockedNote::new(locked, DecryptionPassword::parse("pw")).is_none());

        let open = sample_note("1", "secret text", true);
        let unlocked = UnlockedNote::new(open, DecryptionPassword::parse("pw")).unwrap();
        assert_eq!(unlocked.content(), "secret text");
        assert_eq!(unlocked.decryption_password().unwrap().expose(), "pw");
    }

    #[test]
    fn password_is_trimmed_and_redacted() {
        assert!(DecryptionPassword::parse("   ").is_none());
        let pw = DecryptionPassword::parse("  hunter2 ").unwrap();
        assert_eq!(pw.expose(), "hunter2");
        assert!(!format!("{pw:?}").contains("hunter2"));
    }

    #[test]
    fn sensitivity_bands() {
        let level = |score| {
            NoteSensitivity {
                sensitivity_score: score,
                explanation: String::new(),
            }
            .level()
        };
        assert_eq!(level(0), SensitivityLevel::Low);
        assert_eq!(level(39), SensitivityLevel::Low);
        assert_eq!(level(40), SensitivityLevel::Medium);
        assert_eq!(level(69), SensitivityLevel::Medium);
        assert_eq!(level(70), SensitivityLevel::High);
        assert_eq!(level(100), SensitivityLevel::High);
    }

    #[test]
    fn search_text_skips_encrypted_content() {
        let mut note = sample_note("1", "Body Text", false);
        assert!(note.searchable_text().contains("body text"));
        note.is_encrypted = true;
        assert!(!note.searchable_text().contains("body text"));
    }
}
