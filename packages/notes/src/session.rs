//! # Note view session
//!
//! One [`NoteSession`] backs one mounted note view. It ties together the
//! visibility resolver, the [`PasswordKeeper`] and the view's [`ViewScope`].
//!
//! Fetches are split in two so the session never has to be borrowed across an
//! await: [`NoteSession::begin_load`] / [`NoteSession::begin_unlock`] hand out
//! an owned [`PendingFetch`], the caller runs it, and [`NoteSession::finish`]
//! applies the [`Completed`] result. A result is applied only when
//!
//! - the scope is still live (the view has not been unmounted),
//! - no newer fetch has started since (generation check), and
//! - it belongs to the note currently shown.
//!
//! Anything else is reported as [`Applied::Stale`] and changes nothing.

use tracing::{debug, warn};

use crate::models::{DecryptionPassword, Note, UnlockedNote};
use crate::password::{EditHandoff, PasswordKeeper};
use crate::scope::{Cancelled, ViewScope};
use crate::store::NoteStore;
use crate::visibility::{resolve, ResolveError, Visibility};

const WRONG_PASSWORD: &str = "Incorrect password. Please try again.";

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState {
    Loading,
    /// Waiting for a password. `note` is `None` when the only fetch so far was
    /// a failed unlock, so the title is not known yet.
    Locked {
        note: Option<Note>,
        error: Option<String>,
    },
    Unlocked(UnlockedNote),
    NotFound,
    Failed(ResolveError),
}

impl ViewState {
    pub fn unlocked(&self) -> Option<&UnlockedNote> {
        match self {
            ViewState::Unlocked(unlocked) => Some(unlocked),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, ViewState::Locked { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchKind {
    Load,
    Unlock,
}

/// A fetch handed out by the session, not yet run.
#[derive(Debug)]
#[must_use = "a pending fetch does nothing until it is run"]
pub struct PendingFetch {
    note_id: String,
    generation: u64,
    kind: FetchKind,
    password: Option<DecryptionPassword>,
    scope: ViewScope,
}

impl PendingFetch {
    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    /// Resolve the note under the view's scope.
    pub async fn run<S: NoteStore>(self, store: &S) -> Completed {
        let result = self
            .scope
            .run(resolve(store, &self.note_id, self.password.as_ref()))
            .await;
        Completed {
            note_id: self.note_id,
            generation: self.generation,
            kind: self.kind,
            result,
        }
    }
}

/// The outcome of a [`PendingFetch`], waiting to be applied.
#[derive(Debug)]
pub struct Completed {
    note_id: String,
    generation: u64,
    kind: FetchKind,
    result: Result<Result<Visibility, ResolveError>, Cancelled>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct NoteSession {
    note_id: String,
    scope: ViewScope,
    keeper: PasswordKeeper,
    generation: u64,
    state: ViewState,
}

impl NoteSession {
    pub fn new(note_id: impl Into<String>, scope: ViewScope) -> Self {
        Self {
            note_id: note_id.into(),
            scope,
            keeper: PasswordKeeper::new(),
            generation: 0,
            state: ViewState::Loading,
        }
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// The password that unlocked the current note, if any.
    pub fn password(&self) -> Option<&DecryptionPassword> {
        self.keeper.password_for(&self.note_id)
    }

    fn pending(&mut self, kind: FetchKind, password: Option<DecryptionPassword>) -> PendingFetch {
        self.generation += 1;
        PendingFetch {
            note_id: self.note_id.clone(),
            generation: self.generation,
            kind,
            password,
            scope: self.scope.clone(),
        }
    }

    /// Fetch the note from scratch, optionally with a password (e.g. from the
    /// edit link).
    pub fn begin_load(&mut self, password: Option<DecryptionPassword>) -> PendingFetch {
        self.state = ViewState::Loading;
        self.pending(FetchKind::Load, password)
    }

    /// Retry a locked note with `password`. The prompt stays on screen until
    /// the result is applied.
    pub fn begin_unlock(&mut self, password: DecryptionPassword) -> PendingFetch {
        self.pending(FetchKind::Unlock, Some(password))
    }

    /// Apply a finished fetch if it is still current.
    pub fn finish(&mut self, completed: Completed) -> Applied {
        if !self.scope.is_live()
            || completed.generation != self.generation
            || completed.note_id != self.note_id
        {
            debug!(note_id = %completed.note_id, "discarding stale fetch");
            return Applied::Stale;
        }
        let visibility = match completed.result {
            Ok(result) => result,
            Err(Cancelled) => return Applied::Stale,
        };

        self.state = match visibility {
            Ok(Visibility::Unlocked(unlocked)) => {
                if unlocked.decryption_password().is_some() {
                    self.keeper.forget();
                    if let Err(err) = self.keeper.remember(&unlocked) {
                        warn!(note_id = %self.note_id, "could not remember password: {err}");
                    }
                }
                ViewState::Unlocked(unlocked)
            }
            Ok(Visibility::Locked(note)) => ViewState::Locked {
                note: Some(note),
                error: None,
            },
            Ok(Visibility::WrongPassword { detail }) => {
                debug!(note_id = %self.note_id, detail = ?detail, "password rejected");
                ViewState::Locked {
                    note: self.locked_note(),
                    error: Some(WRONG_PASSWORD.to_string()),
                }
            }
            Ok(Visibility::NotFound) => ViewState::NotFound,
            Err(err) if completed.kind == FetchKind::Unlock && err.is_retryable() => {
                warn!(note_id = %self.note_id, "unlock failed: {err}");
                ViewState::Locked {
                    note: self.locked_note(),
                    error: Some("Failed to decrypt note. Please try again.".to_string()),
                }
            }
            Err(err) => {
                warn!(note_id = %self.note_id, "failed to load note: {err}");
                ViewState::Failed(err)
            }
        };
        Applied::Applied
    }

    fn locked_note(&self) -> Option<Note> {
        match &self.state {
            ViewState::Locked { note, .. } => note.clone(),
            _ => None,
        }
    }

    /// Forget the password and hide the content again. Returns `false` when
    /// there is nothing to re-lock.
    pub fn relock(&mut self) -> bool {
        let ViewState::Unlocked(unlocked) = &self.state else {
            return false;
        };
        if !unlocked.note().is_encrypted {
            return false;
        }
        self.keeper.forget();
        // An unlock still in flight must not undo this.
        self.generation += 1;
        let state = std::mem::replace(&mut self.state, ViewState::Loading);
        if let ViewState::Unlocked(unlocked) = state {
            self.state = ViewState::Locked {
                note: Some(unlocked.relock()),
                error: None,
            };
        }
        true
    }

    /// Point the session at another note. Follow with [`Self::begin_load`].
    pub fn switch_note(&mut self, note_id: impl Into<String>) {
        self.keeper.forget();
        self.generation += 1;
        self.note_id = note_id.into();
        self.state = ViewState::Loading;
    }

    /// Hand the remembered password to the edit flow.
    pub fn handoff_to_edit(&self) -> Option<EditHandoff> {
        self.keeper.handoff_to_edit(&self.note_id)
    }

    /// The view is going away.
    pub fn close(&mut self) {
        self.scope.cancel();
        self.keeper.forget();
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::memory::MemoryNoteStore;
    use crate::store::{NoteDraft, NoteUpdate, Page, StoreError};

    fn pw(s: &str) -> DecryptionPassword {
        DecryptionPassword::parse(s).unwrap()
    }

    /// Holds every fetch until the gate opens.
    struct GatedStore {
        inner: MemoryNoteStore,
        gate: Arc<Notify>,
    }

    impl NoteStore for GatedStore {
        async fn fetch_note(
            &self,
            id: &str,
            password: Option<&DecryptionPassword>,
        ) -> Result<Note, StoreError> {
            self.gate.notified().await;
            self.inner.fetch_note(id, password).await
        }
        async fn list_notes(&self, page: Page) -> Result<Vec<Note>, StoreError> {
            self.inner.list_notes(page).await
        }
        async fn create_note(&self, draft: &NoteDraft) -> Result<Note, StoreError> {
            self.inner.create_note(draft).await
        }
        async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<Note, StoreError> {
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
    async fn locked_then_unlocked_remembers_password() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(None).run(&store).await;
        assert_eq!(session.finish(done), Applied::Applied);
        assert!(session.state().is_locked());
        assert!(session.handoff_to_edit().is_none());

        let done = session.begin_unlock(pw("secret")).run(&store).await;
        assert_eq!(session.finish(done), Applied::Applied);
        assert_eq!(
            session.state().unlocked().map(UnlockedNote::content),
            Some("dear diary")
        );
        let handoff = session.handoff_to_edit().unwrap();
        assert_eq!(handoff.password().expose(), "secret");
    }

    #[tokio::test]
    async fn wrong_password_keeps_prompt_with_title() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(None).run(&store).await;
        session.finish(done);
        let done = session.begin_unlock(pw("guess")).run(&store).await;
        session.finish(done);

        match session.state() {
            ViewState::Locked {
                note: Some(locked),
                error: Some(_),
            } => assert_eq!(locked.title, "Diary"),
            other => panic!("expected locked with error, got {other:?}"),
        }
        assert!(session.password().is_none());
    }

    #[tokio::test]
    async fn wrong_password_on_first_load_prompts_without_title() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(Some(pw("stale"))).run(&store).await;
        session.finish(done);
        assert!(matches!(
            session.state(),
            ViewState::Locked {
                note: None,
                error: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn unmount_during_fetch_discards_result() {
        let inner = MemoryNoteStore::new();
        let note = inner.insert("Diary", "dear diary", Some("secret"));
        let gate = Arc::new(Notify::new());
        let store = GatedStore {
            inner,
            gate: gate.clone(),
        };
        let mut session = NoteSession::new(&note.id, ViewScope::new());
        let pending = session.begin_unlock(pw("secret"));
        let scope = session.scope().clone();

        let unmount = async {
            tokio::task::yield_now().await;
            scope.cancel();
            gate.notify_one();
        };
        let (done, ()) = tokio::join!(pending.run(&store), unmount);

        assert_eq!(session.finish(done), Applied::Stale);
        assert_eq!(session.state(), &ViewState::Loading);
        assert!(session.password().is_none());
    }

    #[tokio::test]
    async fn superseded_fetch_is_stale() {
        let store = MemoryNoteStore::new();
        let first = store.insert("First", "one", None);
        let second = store.insert("Second", "two", None);
        let mut session = NoteSession::new(&first.id, ViewScope::new());

        let old = session.begin_load(None);
        session.switch_note(&second.id);
        let new = session.begin_load(None);

        let old_done = old.run(&store).await;
        let new_done = new.run(&store).await;
        assert_eq!(session.finish(new_done), Applied::Applied);
        assert_eq!(session.finish(old_done), Applied::Stale);
        assert_eq!(
            session.state().unlocked().map(|u| u.note().title.as_str()),
            Some("Second")
        );
    }

    #[tokio::test]
    async fn relock_forgets_and_hides_content() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(Some(pw("secret"))).run(&store).await;
        session.finish(done);
        assert!(session.relock());

        assert!(session.password().is_none());
        match session.state() {
            ViewState::Locked {
                note: Some(locked),
                error: None,
            } => assert!(locked.is_locked()),
            other => panic!("expected locked, got {other:?}"),
        }
        assert!(!session.relock());
    }

    #[tokio::test]
    async fn plain_notes_cannot_be_relocked() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Groceries", "milk", None);
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(None).run(&store).await;
        session.finish(done);
        assert!(!session.relock());
        assert!(session.state().unlocked().is_some());
    }

    #[tokio::test]
    async fn switching_notes_forgets_password() {
        let store = MemoryNoteStore::new();
        let a = store.insert("A", "alpha", Some("pa"));
        let b = store.insert("B", "beta", None);
        let mut session = NoteSession::new(&a.id, ViewScope::new());

        let done = session.begin_load(Some(pw("pa"))).run(&store).await;
        session.finish(done);
        assert!(session.password().is_some());

        session.switch_note(&b.id);
        assert!(session.password().is_none());
        assert!(session.handoff_to_edit().is_none());
        assert_eq!(session.state(), &ViewState::Loading);
    }

    #[tokio::test]
    async fn transient_unlock_failure_keeps_prompt() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(None).run(&store).await;
        session.finish(done);

        store.fail_next(StoreError::Transport("offline".into()));
        let done = session.begin_unlock(pw("secret")).run(&store).await;
        session.finish(done);
        assert!(session.state().is_locked());

        store.fail_next(StoreError::Transport("offline".into()));
        let done = session.begin_load(None).run(&store).await;
        session.finish(done);
        assert!(matches!(session.state(), ViewState::Failed(e) if e.is_retryable()));
    }

    #[tokio::test]
    async fn close_cancels_and_forgets() {
        let store = MemoryNoteStore::new();
        let note = store.insert("Diary", "dear diary", Some("secret"));
        let mut session = NoteSession::new(&note.id, ViewScope::new());

        let done = session.begin_load(Some(pw("secret"))).run(&store).await;
        session.finish(done);
        let pending = session.begin_load(None);
        session.close();

        assert!(!session.scope().is_live());
        assert!(session.password().is_none());
        let done = pending.run(&store).await;
        assert_eq!(session.finish(done), Applied::Stale);
    }
}
