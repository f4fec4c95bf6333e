//! Read-only view of one note.
//!
//! A [`NoteSession`] held in a signal drives what is shown. Every fetch is run
//! through the component's view scope, so a result that arrives after the
//! component is gone is dropped by `NoteSession::finish`.

use api::HttpNoteStore;
use dioxus::prelude::*;
use notes::{
    edit_path, Applied, Completed, DecryptionPassword, NoteSession, NoteStore, PendingFetch,
    ResolveError, StoreError, ViewState,
};

use crate::icons::{FaLockOpen, FaPenToSquare, FaTrashCan};
use crate::note_card::format_timestamp;
use crate::{
    log_activity, log_note_activity, use_activity_log, use_api, use_view_scope, ApiHandle,
    DecryptPrompt, Icon, LogLevel, SensitivityBadge,
};

/// Applies a finished fetch. `None` when it was stale: the fetch that
/// superseded it still owns the busy flag. Otherwise whether the service
/// rejected the session.
pub(crate) fn settle(session: &mut NoteSession, done: Completed) -> Option<bool> {
    if session.finish(done) == Applied::Stale {
        return None;
    }
    Some(matches!(
        session.state(),
        ViewState::Failed(ResolveError::Unauthorized)
    ))
}

fn spawn_fetch(
    pending: PendingFetch,
    mut session: Signal<NoteSession>,
    mut busy: Signal<bool>,
    mut api: ApiHandle,
) {
    busy.set(true);
    spawn(async move {
        let client = api.client();
        let done = pending.run(&HttpNoteStore::new(&client)).await;
        let Ok(mut current) = session.try_write() else {
            return;
        };
        let Some(unauthorized) = settle(&mut current, done) else {
            return;
        };
        drop(current);
        busy.set(false);
        if unauthorized {
            api.expire_session();
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn confirm(_message: &str) -> bool {
    true
}

#[component]
pub fn NoteViewer(
    note_id: String,
    /// Receives the edit page path, with the password attached when the note
    /// was unlocked here.
    on_edit: EventHandler<String>,
    /// Called after deleting the note.
    on_deleted: EventHandler<()>,
) -> Element {
    let scope = use_view_scope();
    let mut api = use_api();
    let mut activity_log = use_activity_log();

    // Track the id in a signal so the effect re-runs on route param change
    let mut id_signal = use_signal(|| note_id.clone());
    if *id_signal.peek() != note_id {
        id_signal.set(note_id.clone());
    }

    let mut session = use_signal({
        let scope = scope.clone();
        let note_id = note_id.clone();
        move || NoteSession::new(note_id, scope)
    });
    let busy = use_signal(|| false);
    let mut action_error = use_signal(|| Option::<String>::None);

    use_drop(move || {
        if let Ok(mut current) = session.try_write() {
            current.close();
        }
    });

    use_effect(move || {
        let id = id_signal();
        let pending = {
            let mut current = session.write();
            if current.note_id() != id {
                current.switch_note(id);
            }
            current.begin_load(None)
        };
        spawn_fetch(pending, session, busy, api);
    });

    let unlock = move |value: String| {
        let Some(password) = DecryptionPassword::parse(&value) else {
            return;
        };
        let pending = session.write().begin_unlock(password);
        spawn_fetch(pending, session, busy, api);
    };

    let retry = move |_| {
        let pending = session.write().begin_load(None);
        spawn_fetch(pending, session, busy, api);
    };

    let relock = move |_| {
        let note = session
            .peek()
            .state()
            .unlocked()
            .map(|n| (n.id().to_string(), n.note().title.clone()));
        if session.write().relock() {
            if let Some((id, title)) = note {
                log_note_activity(
                    &mut activity_log,
                    LogLevel::Info,
                    &id,
                    &format!("Locked \"{title}\" again"),
                );
            }
        }
    };

    let edit = move |_| {
        let path = {
            let current = session.peek();
            match current.handoff_to_edit() {
                Some(handoff) => handoff.edit_path(),
                None => edit_path(current.note_id()),
            }
        };
        on_edit.call(path);
    };

    let delete = {
        let scope = scope.clone();
        move |_| {
            if !confirm("Are you sure you want to delete this note?") {
                return;
            }
            let scope = scope.clone();
            let id = session.peek().note_id().to_string();
            spawn(async move {
                action_error.set(None);
                let client = api.client();
                let store = HttpNoteStore::new(&client);
                match scope.run(store.delete_note(&id)).await {
                    Err(_cancelled) => {}
                    Ok(Ok(())) => {
                        activity_log.write().forget_note(&id);
                        log_activity(&mut activity_log, LogLevel::Success, "Note deleted");
                        on_deleted.call(());
                    }
                    Ok(Err(StoreError::Unauthorized)) => api.expire_session(),
                    Ok(Err(err)) => {
                        log_activity(&mut activity_log, LogLevel::Error, &format!("Delete failed: {err}"));
                        action_error.set(Some("Failed to delete note. Please try again.".to_string()));
                    }
                }
            });
        }
    };

    let state = session.read().state().clone();
    let body = match state {
        ViewState::Loading => rsx! {
            div { class: "view-placeholder", "Loading..." }
        },
        ViewState::Locked { note, error } => rsx! {
            DecryptPrompt {
                title: note.map(|n| n.title),
                error,
                busy: busy(),
                on_submit: unlock,
            }
        },
        ViewState::Unlocked(unlocked) => {
            let note = unlocked.note().clone();
            let created = format_timestamp(note.created_at);
            let updated = format_timestamp(note.updated_at);
            rsx! {
                article {
                    class: "note-view",
                    header {
                        class: "note-view-header",
                        h1 { "{note.title}" }
                        div {
                            class: "note-view-actions",
                            if note.is_encrypted {
                                button {
                                    class: "btn btn-ghost",
                                    title: "Lock again",
                                    onclick: relock,
                                    Icon { icon: FaLockOpen, width: 14, height: 14 }
                                    " Lock"
                                }
                            }
                            button {
                                class: "btn",
                                onclick: edit,
                                Icon { icon: FaPenToSquare, width: 14, height: 14 }
                                " Edit"
                            }
                        }
                    }
                    div {
                        class: "note-meta muted",
                        span { "Created {created}" }
                        span { "Updated {updated}" }
                        if note.is_encrypted {
                            span { class: "badge", "Encrypted" }
                        }
                        if let Some(sensitivity) = note.sensitivity.clone() {
                            SensitivityBadge { sensitivity }
                        }
                    }
                    div { class: "note-content", "{note.content}" }
                }
            }
        }
        ViewState::NotFound => rsx! {
            div {
                class: "view-placeholder",
                h2 { "Note not found" }
                p { class: "muted", "It may have been deleted or you don't have access to it." }
            }
        },
        ViewState::Failed(err) => {
            let retryable = err.is_retryable();
            rsx! {
                div {
                    class: "view-placeholder",
                    h2 { "Could not load this note" }
                    p { class: "form-error", "{err}" }
                    if retryable {
                        button { class: "btn", onclick: retry, "Try again" }
                    }
                }
            }
        }
    };

    let can_delete = matches!(
        session.read().state(),
        ViewState::Locked { .. } | ViewState::Unlocked(_)
    );

    rsx! {
        div {
            class: "note-viewer",
            {body}
            if let Some(err) = action_error() {
                p { class: "form-error", "{err}" }
            }
            if can_delete {
                button {
                    class: "btn btn-danger",
                    onclick: delete,
                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                    " Delete"
                }
            }
        }
    }
}
