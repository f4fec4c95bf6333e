use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{DecryptionPassword, Note, LOCKED_CONTENT};
use crate::store::{NoteDraft, NoteStore, NoteUpdate, Page, StoreError};

/// One recorded call against a [`MemoryNoteStore`].
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCall {
    Fetch {
        id: String,
        password: Option<DecryptionPassword>,
    },
    List(Page),
    Create(NoteDraft),
    Update {
        id: String,
        update: NoteUpdate,
    },
    Recreate {
        id: String,
        draft: NoteDraft,
        delete_original: bool,
        original_password: Option<DecryptionPassword>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug)]
struct StoredNote {
    /// Always plaintext.
    note: Note,
    password: Option<DecryptionPassword>,
}

#[derive(Debug)]
struct Inner {
    notes: BTreeMap<String, StoredNote>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreError>,
    next_id: u64,
    clock: f64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            notes: BTreeMap::new(),
            calls: Vec::new(),
            fail_next: None,
            next_id: 1,
            clock: 1_700_000_000.0,
        }
    }
}

/// In-memory NoteStore for tests and offline demos.
///
/// Behaves like the note service: encrypted notes come back with the locked
/// placeholder unless the right password is supplied, a wrong password is
/// rejected with a 400, and recreate is a single server-side step.
#[derive(Clone, Debug, Default)]
pub struct MemoryNoteStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a note directly, bypassing call recording.
    pub fn insert(&self, title: &str, content: &str, password: Option<&str>) -> Note {
        let mut inner = self.lock();
        let password = password.and_then(DecryptionPassword::parse);
        let note = inner.new_note(title, content, password.is_some());
        inner.notes.insert(
            note.id.clone(),
            StoredNote {
                note: note.clone(),
                password,
            },
        );
        note
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make the next call fail with `error` (after being recorded).
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_next = Some(error);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().notes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stored plaintext, regardless of encryption.
    pub fn plaintext(&self, id: &str) -> Option<String> {
        self.lock().notes.get(id).map(|s| s.note.content.clone())
    }

    /// Whether `password` is the one the note is encrypted with.
    pub fn has_password(&self, id: &str, password: &str) -> bool {
        self.lock()
            .notes
            .get(id)
            .and_then(|s| s.password.as_ref())
            .is_some_and(|pw| pw.expose() == password)
    }
}

impl Inner {
    fn record(&mut self, call: StoreCall) -> Result<(), StoreError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> f64 {
        self.clock += 1.0;
        self.clock
    }

    fn new_note(&mut self, title: &str, content: &str, is_encrypted: bool) -> Note {
        let id = format!("note-{}", self.next_id);
        self.next_id += 1;
        let now = self.tick();
        Note {
            id,
            user_id: "user-1".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            is_encrypted,
            created_at: now,
            updated_at: now,
            sensitivity: None,
        }
    }

    fn insert_draft(&mut self, draft: &NoteDraft) -> Result<Note, StoreError> {
        validate_draft(draft)?;
        let note = self.new_note(&draft.title, &draft.content, draft.is_encrypted);
        let password = if draft.is_encrypted {
            draft.encryption_password.clone()
        } else {
            None
        };
        self.notes.insert(
            note.id.clone(),
            StoredNote {
                note: note.clone(),
                password,
            },
        );
        Ok(as_returned(note))
    }
}

fn validate_draft(draft: &NoteDraft) -> Result<(), StoreError> {
    if draft.title.is_empty() || draft.content.is_empty() {
        return Err(rejected(422, "title and content are required"));
    }
    if draft.is_encrypted && draft.encryption_password.is_none() {
        return Err(rejected(400, "Password is required to encrypt a note"));
    }
    Ok(())
}

fn rejected(status: u16, detail: &str) -> StoreError {
    StoreError::Rejected {
        status,
        detail: detail.to_string(),
    }
}

/// Encrypted notes leave the service locked.
fn as_returned(mut note: Note) -> Note {
    if note.is_encrypted {
        note.content = LOCKED_CONTENT.to_string();
    }
    note
}

fn password_matches(stored: &StoredNote, given: Option<&DecryptionPassword>) -> bool {
    match (&stored.password, given) {
        (None, _) => true,
        (Some(expected), Some(given)) => expected == given,
        (Some(_), None) => false,
    }
}

impl NoteStore for MemoryNoteStore {
    async fn fetch_note(
        &self,
        id: &str,
        password: Option<&DecryptionPassword>,
    ) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::Fetch {
            id: id.to_string(),
            password: password.cloned(),
        })?;
        let stored = inner.notes.get(id).ok_or(StoreError::NotFound)?;
        if !stored.note.is_encrypted {
            return Ok(stored.note.clone());
        }
        match password {
            None => Ok(as_returned(stored.note.clone())),
            Some(_) if password_matches(stored, password) => Ok(stored.note.clone()),
            Some(_) => Err(rejected(400, "Failed to decrypt note: Decryption failed")),
        }
    }

    async fn list_notes(&self, page: Page) -> Result<Vec<Note>, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::List(page))?;
        Ok(inner
            .notes
            .values()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .map(|s| as_returned(s.note.clone()))
            .collect())
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::Create(draft.clone()))?;
        inner.insert_draft(draft)
    }

    async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::Update {
            id: id.to_string(),
            update: update.clone(),
        })?;
        let now = inner.tick();
        let stored = inner.notes.get_mut(id).ok_or(StoreError::NotFound)?;
        let was_encrypted = stored.note.is_encrypted;

        if was_encrypted && update.content.is_none() && !update.is_encrypted {
            return Err(rejected(400, "Content is required to decrypt a note"));
        }
        if update.is_encrypted && !was_encrypted && update.encryption_password.is_none() {
            return Err(rejected(400, "Password is required to encrypt a note"));
        }

        if let Some(title) = &update.title {
            stored.note.title = title.clone();
        }
        if let Some(content) = &update.content {
            stored.note.content = content.clone();
        }
        stored.note.is_encrypted = update.is_encrypted;
        stored.password = if update.is_encrypted {
            update
                .encryption_password
                .clone()
                .or_else(|| stored.password.clone())
        } else {
            None
        };
        stored.note.updated_at = now;
        Ok(as_returned(stored.note.clone()))
    }

    async fn recreate_note(
        &self,
        id: &str,
        draft: &NoteDraft,
        delete_original: bool,
        original_password: Option<&DecryptionPassword>,
    ) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::Recreate {
            id: id.to_string(),
            draft: draft.clone(),
            delete_original,
            original_password: original_password.cloned(),
        })?;
        let original = inner.notes.get(id).ok_or(StoreError::NotFound)?;
        if !password_matches(original, original_password) {
            return Err(rejected(
                400,
                "Cannot recreate note: original content could not be decrypted",
            ));
        }
        let created = inner.insert_draft(draft)?;
        if delete_original {
            inner.notes.remove(id);
        }
        Ok(created)
    }

    async fn delete_note(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.record(StoreCall::Delete { id: id.to_string() })?;
        inner
            .notes
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> DecryptionPassword {
        DecryptionPassword::parse(s).unwrap()
    }

    #[tokio::test]
    async fn encrypted_note_is_locked_without_password() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));

        let fetched = store.fetch_note(&note.id, None).await.unwrap();
        assert!(fetched.is_locked());

        let opened = store.fetch_note(&note.id, Some(&pw("secret"))).await.unwrap();
        assert_eq!(opened.content, "dear diary");

        let err = store.fetch_note(&note.id, Some(&pw("nope"))).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn recreate_replaces_original() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        let draft = NoteDraft::encrypted("Diary", "dear diary", pw("new"));

        let created = store
            .recreate_note(&note.id, &draft, true, Some(&pw("old")))
            .await
            .unwrap();

        assert_ne!(created.id, note.id);
        assert!(!store.contains(&note.id));
        assert!(store.has_password(&created.id, "new"));
        assert_eq!(store.plaintext(&created.id).as_deref(), Some("dear diary"));
    }

    #[tokio::test]
    async fn recreate_with_wrong_original_password_keeps_original() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        let draft = NoteDraft::encrypted("Diary", "dear diary", pw("new"));

        let err = store
            .recreate_note(&note.id, &draft, true, Some(&pw("wrong")))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Rejected { status: 400, .. }));
        assert!(store.contains(&note.id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_is_recorded_once() {
        let store = MemoryNoteStore::new();
        store.fail_next(StoreError::Transport("offline".into()));

        assert!(store.list_notes(Page::default()).await.is_err());
        assert!(store.list_notes(Page::default()).await.is_ok());
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_note_is_not_found() {
        let store = MemoryNoteStore::new();
        assert_eq!(store.delete_note("ghost").await, Err(StoreError::NotFound));
    }
}
