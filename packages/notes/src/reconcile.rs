//! # Save reconciliation: one decision, one call
//!
//! Saving the note form is a choice between six strategies, fixed by whether
//! an original note exists, whether it was encrypted, and whether it will be:
//!
//! | Original | Was encrypted | Will be encrypted | [`StrategyKind`] |
//! |----------|---------------|-------------------|------------------|
//! | none | – | no | `CreatePlain` |
//! | none | – | yes | `CreateEncrypted` |
//! | some | no | no | `UpdatePlain` |
//! | some | no | yes | `UpdateEncrypt` |
//! | some | yes | yes | `Recreate` |
//! | some | yes | no | `UpdateDecrypt` |
//!
//! The service cannot re-key an encrypted note in place, so keeping a note
//! encrypted goes through `Recreate`: a server-side create-then-delete that
//! gives the note a new id.
//!
//! [`reconcile`] validates and builds a [`SaveStrategy`] without touching the
//! network. [`execute`] issues exactly one store call for it and never
//! retries. Validation failures therefore never reach the store.

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::{DecryptionPassword, Note, UnlockedNote};
use crate::store::{NoteDraft, NoteStore, NoteUpdate, StoreError};

/// Longest title the note service accepts.
pub const MAX_TITLE_CHARS: usize = 100;

/// What the user asked for when pressing save.
#[derive(Clone, Debug, PartialEq)]
pub struct EncryptionIntent {
    pub was_encrypted: bool,
    pub will_be_encrypted: bool,
    /// Trimmed; `None` when blank.
    pub new_password: Option<DecryptionPassword>,
}

impl EncryptionIntent {
    pub fn new(original: Option<&Note>, will_be_encrypted: bool, new_password: &str) -> Self {
        Self {
            was_encrypted: original.is_some_and(|n| n.is_encrypted),
            will_be_encrypted,
            new_password: DecryptionPassword::parse(new_password),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    CreatePlain,
    CreateEncrypted,
    UpdatePlain,
    UpdateEncrypt,
    Recreate,
    UpdateDecrypt,
}

impl StrategyKind {
    /// Total over all inputs; `was_encrypted` is ignored for new notes.
    pub fn select(original_present: bool, was_encrypted: bool, will_be_encrypted: bool) -> Self {
        match (original_present, was_encrypted, will_be_encrypted) {
            (false, _, false) => StrategyKind::CreatePlain,
            (false, _, true) => StrategyKind::CreateEncrypted,
            (true, false, false) => StrategyKind::UpdatePlain,
            (true, false, true) => StrategyKind::UpdateEncrypt,
            (true, true, true) => StrategyKind::Recreate,
            (true, true, false) => StrategyKind::UpdateDecrypt,
        }
    }

    pub fn needs_new_password(self) -> bool {
        matches!(
            self,
            StrategyKind::CreateEncrypted | StrategyKind::UpdateEncrypt | StrategyKind::Recreate
        )
    }

    pub fn needs_original_password(self) -> bool {
        matches!(self, StrategyKind::Recreate | StrategyKind::UpdateDecrypt)
    }
}

/// A fully validated save, ready to execute.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveStrategy {
    CreatePlain {
        draft: NoteDraft,
    },
    CreateEncrypted {
        draft: NoteDraft,
    },
    UpdatePlain {
        id: String,
        update: NoteUpdate,
    },
    UpdateEncrypt {
        id: String,
        update: NoteUpdate,
    },
    Recreate {
        id: String,
        draft: NoteDraft,
        original_password: DecryptionPassword,
    },
    UpdateDecrypt {
        id: String,
        update: NoteUpdate,
    },
}

impl SaveStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            SaveStrategy::CreatePlain { .. } => StrategyKind::CreatePlain,
            SaveStrategy::CreateEncrypted { .. } => StrategyKind::CreateEncrypted,
            SaveStrategy::UpdatePlain { .. } => StrategyKind::UpdatePlain,
            SaveStrategy::UpdateEncrypt { .. } => StrategyKind::UpdateEncrypt,
            SaveStrategy::Recreate { .. } => StrategyKind::Recreate,
            SaveStrategy::UpdateDecrypt { .. } => StrategyKind::UpdateDecrypt,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SaveError {
    #[error("{0}")]
    InvalidDraft(String),

    #[error("a password is required to encrypt this note")]
    MissingPassword,

    #[error("the original decryption password is required")]
    MissingOriginalPassword,

    #[error("note not found")]
    NotFound,

    #[error("session is no longer valid")]
    Unauthorized,

    #[error("{detail}")]
    Rejected { detail: String },

    #[error("failed to save note: {0}")]
    Failed(StoreError),

    #[error("unexpected response from the note service: {0}")]
    Protocol(String),

    /// The old note may or may not still exist, and the new one may or may not
    /// have been created.
    #[error("recreating the note did not complete: {0}")]
    RecreateFailed(StoreError),
}

impl SaveError {
    /// Caught before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SaveError::InvalidDraft(_)
                | SaveError::MissingPassword
                | SaveError::MissingOriginalPassword
        )
    }

    /// Text shown on the form.
    pub fn user_message(&self) -> String {
        match self {
            SaveError::InvalidDraft(msg) => msg.clone(),
            SaveError::MissingPassword => {
                "Password is required when encrypting a note".to_string()
            }
            SaveError::MissingOriginalPassword => {
                "Original decryption password is required to access the content".to_string()
            }
            SaveError::NotFound => {
                "Note not found. It may have been deleted or you don't have access to it."
                    .to_string()
            }
            SaveError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            SaveError::Rejected { detail } => detail.clone(),
            SaveError::Failed(_) => "Failed to save note. Please try again.".to_string(),
            SaveError::Protocol(_) => "Something went wrong. Please try again later.".to_string(),
            SaveError::RecreateFailed(_) => {
                "Saving did not complete. Please check your notes list before trying again."
                    .to_string()
            }
        }
    }
}

/// Result of a successful save. After `Recreate` the original id is gone and
/// `note.id` is the one to navigate with.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveOutcome {
    pub note: Note,
    pub strategy: StrategyKind,
}

fn validate_fields(title: &str, content: &str) -> Result<(String, String), SaveError> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() {
        return Err(SaveError::InvalidDraft("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(SaveError::InvalidDraft(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    if content.is_empty() {
        return Err(SaveError::InvalidDraft("Content is required".to_string()));
    }
    Ok((title.to_string(), content.to_string()))
}

/// Pick and validate the save strategy. Pure; no store access.
///
/// `original` is the note as unlocked for editing, carrying the password that
/// opened it when it was encrypted.
pub fn reconcile(
    original: Option<&UnlockedNote>,
    intent: &EncryptionIntent,
    title: &str,
    content: &str,
) -> Result<SaveStrategy, SaveError> {
    let was_encrypted = original.map_or(intent.was_encrypted, |n| n.note().is_encrypted);
    let kind = StrategyKind::select(original.is_some(), was_encrypted, intent.will_be_encrypted);
    let (title, content) = validate_fields(title, content)?;

    let new_password = if kind.needs_new_password() {
        Some(
            intent
                .new_password
                .clone()
                .ok_or(SaveError::MissingPassword)?,
        )
    } else {
        None
    };
    let original_password = if kind.needs_original_password() {
        Some(
            original
                .and_then(UnlockedNote::decryption_password)
                .cloned()
                .ok_or(SaveError::MissingOriginalPassword)?,
        )
    } else {
        None
    };

    let id = || original.map(|n| n.id().to_string()).unwrap_or_default();
    let update = |is_encrypted: bool,
                  encryption_password: Option<DecryptionPassword>,
                  old_encryption_password: Option<DecryptionPassword>| NoteUpdate {
        title: Some(title.clone()),
        content: Some(content.clone()),
        is_encrypted,
        encryption_password,
        old_encryption_password,
    };

    let strategy = match (kind, new_password, original_password) {
        (StrategyKind::CreatePlain, _, _) => SaveStrategy::CreatePlain {
            draft: NoteDraft::plain(&title, &content),
        },
        (StrategyKind::CreateEncrypted, Some(pw), _) => SaveStrategy::CreateEncrypted {
            draft: NoteDraft::encrypted(&title, &content, pw),
        },
        (StrategyKind::UpdatePlain, _, _) => SaveStrategy::UpdatePlain {
            id: id(),
            update: update(false, None, None),
        },
        (StrategyKind::UpdateEncrypt, Some(pw), _) => SaveStrategy::UpdateEncrypt {
            id: id(),
            update: update(true, Some(pw), None),
        },
        (StrategyKind::Recreate, Some(pw), Some(original_password)) => SaveStrategy::Recreate {
            id: id(),
            draft: NoteDraft::encrypted(&title, &content, pw),
            original_password,
        },
        (StrategyKind::UpdateDecrypt, _, Some(original_password)) => SaveStrategy::UpdateDecrypt {
            id: id(),
            update: update(false, None, Some(original_password)),
        },
        // The checks above guarantee the passwords each kind needs.
        (StrategyKind::CreateEncrypted | StrategyKind::UpdateEncrypt, None, _) => {
            return Err(SaveError::MissingPassword)
        }
        (StrategyKind::Recreate, _, _) | (StrategyKind::UpdateDecrypt, _, None) => {
            return Err(SaveError::MissingOriginalPassword)
        }
    };
    debug!(strategy = ?strategy.kind(), "save strategy selected");
    Ok(strategy)
}

fn classify(err: StoreError) -> SaveError {
    match err {
        StoreError::NotFound => SaveError::NotFound,
        StoreError::Unauthorized => SaveError::Unauthorized,
        StoreError::Rejected { detail, .. } => SaveError::Rejected { detail },
        StoreError::Protocol(msg) => SaveError::Protocol(msg),
        err => SaveError::Failed(err),
    }
}

/// Run one strategy against the store. Exactly one call, no retries.
pub async fn execute<S: NoteStore>(
    store: &S,
    strategy: SaveStrategy,
) -> Result<SaveOutcome, SaveError> {
    let kind = strategy.kind();
    let result = match &strategy {
        SaveStrategy::CreatePlain { draft } | SaveStrategy::CreateEncrypted { draft } => {
            store.create_note(draft).await.map_err(classify)
        }
        SaveStrategy::UpdatePlain { id, update }
        | SaveStrategy::UpdateEncrypt { id, update }
        | SaveStrategy::UpdateDecrypt { id, update } => {
            store.update_note(id, update).await.map_err(classify)
        }
        SaveStrategy::Recreate {
            id,
            draft,
            original_password,
        } => store
            .recreate_note(id, draft, true, Some(original_password))
            .await
            .map_err(|err| match err {
                StoreError::Server { .. } | StoreError::Transport(_) => {
                    error!(note_id = %id, "recreate ended in an unknown state: {err}");
                    SaveError::RecreateFailed(err)
                }
                err => classify(err),
            }),
    };

    match result {
        Ok(note) => {
            debug!(strategy = ?kind, note_id = %note.id, "note saved");
            Ok(SaveOutcome {
                note,
                strategy: kind,
            })
        }
        Err(err) => {
            warn!(strategy = ?kind, "save failed: {err}");
            Err(err)
        }
    }
}

/// [`reconcile`] then [`execute`].
pub async fn save<S: NoteStore>(
    store: &S,
    original: Option<&UnlockedNote>,
    intent: &EncryptionIntent,
    title: &str,
    content: &str,
) -> Result<SaveOutcome, SaveError> {
    let strategy = reconcile(original, intent, title, content)?;
    execute(store, strategy).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::memory::{MemoryNoteStore, StoreCall};
    use crate::scope::{Cancelled, ViewScope};
    use crate::store::Page;
    use crate::visibility::{resolve, Visibility};

    fn pw(s: &str) -> DecryptionPassword {
        DecryptionPassword::parse(s).unwrap()
    }

    async fn open(store: &MemoryNoteStore, id: &str, password: Option<&str>) -> UnlockedNote {
        let password = password.map(pw);
        match resolve(store, id, password.as_ref()).await.unwrap() {
            Visibility::Unlocked(unlocked) => unlocked,
            other => panic!("expected unlocked, got {other:?}"),
        }
    }

    #[test]
    fn selection_covers_every_combination_once() {
        use StrategyKind::*;
        let cases = [
            ((false, false, false), CreatePlain),
            ((false, true, false), CreatePlain),
            ((false, false, true), CreateEncrypted),
            ((false, true, true), CreateEncrypted),
            ((true, false, false), UpdatePlain),
            ((true, false, true), UpdateEncrypt),
            ((true, true, true), Recreate),
            ((true, true, false), UpdateDecrypt),
        ];
        for ((present, was, will), expected) in cases {
            assert_eq!(StrategyKind::select(present, was, will), expected);
        }
    }

    #[test]
    fn intent_trims_password() {
        let intent = EncryptionIntent::new(None, true, "   ");
        assert!(intent.new_password.is_none());
        assert!(!intent.was_encrypted);

        let intent = EncryptionIntent::new(None, true, " abc123 ");
        assert_eq!(intent.new_password, Some(pw("abc123")));
    }

    #[tokio::test]
    async fn new_plain_note_is_one_create_call() {
        let store = MemoryNoteStore::new();
        let intent = EncryptionIntent::new(None, false, "");

        let outcome = save(&store, None, &intent, "Groceries", "milk, eggs")
            .await
            .unwrap();

        assert_eq!(outcome.strategy, StrategyKind::CreatePlain);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Create(NoteDraft::plain("Groceries", "milk, eggs"))]
        );
    }

    #[tokio::test]
    async fn new_encrypted_note_carries_password() {
        let store = MemoryNoteStore::new();
        let intent = EncryptionIntent::new(None, true, "s3cret");

        let outcome = save(&store, None, &intent, "Diary", "dear diary").await.unwrap();

        assert_eq!(outcome.strategy, StrategyKind::CreateEncrypted);
        assert!(outcome.note.is_locked());
        assert!(store.has_password(&outcome.note.id, "s3cret"));
    }

    #[tokio::test]
    async fn encrypting_existing_note_is_one_update_call() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Groceries", "milk", None);
        let original = open(&store, &note.id, None).await;
        store.clear_calls();

        let intent = EncryptionIntent::new(Some(original.note()), true, "abc123");
        let outcome = save(&store, Some(&original), &intent, "Groceries", "milk")
            .await
            .unwrap();

        assert_eq!(outcome.strategy, StrategyKind::UpdateEncrypt);
        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        let StoreCall::Update { id, update } = &calls[0] else {
            panic!("expected update, got {calls:?}");
        };
        assert_eq!(id, &note.id);
        assert!(update.is_encrypted);
        assert_eq!(update.encryption_password, Some(pw("abc123")));
    }

    #[tokio::test]
    async fn rekeying_encrypted_note_recreates_it() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        let original = open(&store, &note.id, Some("old")).await;
        store.clear_calls();

        let intent = EncryptionIntent::new(Some(original.note()), true, "new");
        let outcome = save(&store, Some(&original), &intent, "Diary", "dear diary, again")
            .await
            .unwrap();

        assert_eq!(outcome.strategy, StrategyKind::Recreate);
        assert_ne!(outcome.note.id, note.id);
        assert!(!store.contains(&note.id));
        assert!(store.has_password(&outcome.note.id, "new"));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Recreate {
                id: note.id.clone(),
                draft: NoteDraft::encrypted("Diary", "dear diary, again", pw("new")),
                delete_original: true,
                original_password: Some(pw("old")),
            }]
        );
    }

    #[tokio::test]
    async fn recreate_without_original_password_issues_no_call() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        // Plaintext in hand but the unlock password was lost.
        let mut plain = note.clone();
        plain.content = "dear diary".to_string();
        let original = UnlockedNote::new(plain, None).unwrap();

        let intent = EncryptionIntent::new(Some(original.note()), true, "new");
        let err = save(&store, Some(&original), &intent, "Diary", "dear diary")
            .await
            .unwrap_err();

        assert_eq!(err, SaveError::MissingOriginalPassword);
        assert!(err.is_validation());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_new_password_is_rejected_before_network() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Groceries", "milk", None);
        let original = open(&store, &note.id, None).await;
        store.clear_calls();

        for blank in ["", "   ", "\t\n"] {
            let intent = EncryptionIntent::new(Some(original.note()), true, blank);
            let err = save(&store, Some(&original), &intent, "Groceries", "milk")
                .await
                .unwrap_err();
            assert_eq!(err, SaveError::MissingPassword);

            let intent = EncryptionIntent::new(None, true, blank);
            let err = save(&store, None, &intent, "New", "body").await.unwrap_err();
            assert_eq!(err, SaveError::MissingPassword);
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn decrypting_sends_original_password() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        let original = open(&store, &note.id, Some("old")).await;
        store.clear_calls();

        let intent = EncryptionIntent::new(Some(original.note()), false, "");
        let outcome = save(&store, Some(&original), &intent, "Diary", "dear diary")
            .await
            .unwrap();

        assert_eq!(outcome.strategy, StrategyKind::UpdateDecrypt);
        assert!(!outcome.note.is_encrypted);
        assert_eq!(outcome.note.content, "dear diary");
        let calls = store.calls();
        let StoreCall::Update { update, .. } = &calls[0] else {
            panic!("expected update");
        };
        assert!(!update.is_encrypted);
        assert_eq!(update.encryption_password, None);
        assert_eq!(update.old_encryption_password, Some(pw("old")));
    }

    #[tokio::test]
    async fn plain_update_keeps_id() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Groceries", "milk", None);
        let original = open(&store, &note.id, None).await;

        let intent = EncryptionIntent::new(Some(original.note()), false, "ignored");
        let outcome = save(&store, Some(&original), &intent, "Shopping", "milk, bread")
            .await
            .unwrap();

        assert_eq!(outcome.strategy, StrategyKind::UpdatePlain);
        assert_eq!(outcome.note.id, note.id);
        assert_eq!(outcome.note.title, "Shopping");
    }

    #[tokio::test]
    async fn draft_validation() {
        let store = MemoryNoteStore::new();
        let intent = EncryptionIntent::new(None, false, "");

        let err = save(&store, None, &intent, "  ", "body").await.unwrap_err();
        assert_eq!(err, SaveError::InvalidDraft("Title is required".to_string()));

        let long = "x".repeat(MAX_TITLE_CHARS + 1);
        let err = save(&store, None, &intent, &long, "body").await.unwrap_err();
        assert!(matches!(err, SaveError::InvalidDraft(_)));

        let err = save(&store, None, &intent, "Title", "").await.unwrap_err();
        assert_eq!(err, SaveError::InvalidDraft("Content is required".to_string()));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn recreate_transport_failure_is_ambiguous() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("old"));
        let original = open(&store, &note.id, Some("old")).await;
        store.clear_calls();

        store.fail_next(StoreError::Server {
            status: 500,
            detail: "Failed to recreate note".into(),
        });
        let intent = EncryptionIntent::new(Some(original.note()), true, "new");
        let err = save(&store, Some(&original), &intent, "Diary", "dear diary")
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::RecreateFailed(_)));
        assert!(err.user_message().contains("check your notes list"));
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn store_failures_are_typed() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Groceries", "milk", None);
        let original = open(&store, &note.id, None).await;
        let intent = EncryptionIntent::new(Some(original.note()), false, "");

        store.fail_next(StoreError::Transport("offline".into()));
        let err = save(&store, Some(&original), &intent, "G", "m").await.unwrap_err();
        assert!(matches!(err, SaveError::Failed(_)));

        store.fail_next(StoreError::NotFound);
        let err = save(&store, Some(&original), &intent, "G", "m").await.unwrap_err();
        assert_eq!(err, SaveError::NotFound);

        store.fail_next(StoreError::Protocol("missing id".into()));
        let err = save(&store, Some(&original), &intent, "G", "m").await.unwrap_err();
        assert!(matches!(err, SaveError::Protocol(_)));
    }

    /// Parks `update_note` until the gate opens and announces when it does.
    struct GatedUpdates {
        inner: MemoryNoteStore,
        entered: Arc<Notify>,
        gate: Arc<Notify>,
    }

    impl NoteStore for GatedUpdates {
        async fn fetch_note(
            &self,
            id: &str,
            password: Option<&DecryptionPassword>,
        ) -> Result<Note, StoreError> {
            self.inner.fetch_note(id, password).await
        }
        async fn list_notes(&self, page: Page) -> Result<Vec<Note>, StoreError> {
            self.inner.list_notes(page).await
        }
        async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
            self.inner.create_note(draft).await
        }
        async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<Note, StoreError> {
            self.entered.notify_one();
            self.gate.notified().await;
            self.inner.update_note(id, update).await
        }
        async fn recreate_note(
            &self,
            id: &str,
            draft: &NoteDraft,
            delete_original: bool,
            original_password: Option<&DecryptionPassword>,
        ) -> Result<Note, StoreError> {
            self.inner
                .recreate_note(id, draft, delete_original, original_password)
                .await
        }
        async fn delete_note(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete_note(id).await
        }
    }

    #[tokio::test]
    async fn closing_the_view_mid_save_yields_cancelled() {
        let inner = MemoryNoteStore::new();
        let note = inner.insert("Groceries", "milk", None);
        let original = open(&inner, &note.id, None).await;
        inner.clear_calls();
        let store = GatedUpdates {
            inner,
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
        };
        let scope = ViewScope::new();
        let intent = EncryptionIntent::new(Some(original.note()), false, "");

        let (result, ()) = tokio::join!(
            scope.run(save(&store, Some(&original), &intent, "Groceries", "milk, eggs")),
            async {
                store.entered.notified().await;
                scope.cancel();
            }
        );

        assert_eq!(result, Err(Cancelled));
        assert!(!scope.is_live());
        // The request never completed, so nothing reached the store
        assert!(store.inner.calls().is_empty());
        assert_eq!(store.inner.plaintext(&note.id).as_deref(), Some("milk"));

        // A save on a closed view never starts
        let again = scope
            .run(save(&store, Some(&original), &intent, "Groceries", "milk, eggs"))
            .await;
        assert_eq!(again, Err(Cancelled));
    }
}
