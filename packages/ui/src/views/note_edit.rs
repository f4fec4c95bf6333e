use api::HttpNoteStore;
use dioxus::prelude::*;
use notes::{DecryptionPassword, Note, NoteSession, ViewState};

use crate::note_viewer::settle;
use crate::{use_api, use_view_scope, DecryptPrompt, NoteForm};

/// Edit page: unlock the note, then hand it to [`NoteForm`].
///
/// `password` comes from the page link. It is tried once on mount; if it is
/// missing or wrong the decrypt prompt is shown instead.
#[component]
pub fn NoteEditView(
    note_id: String,
    password: Option<DecryptionPassword>,
    on_saved: EventHandler<Note>,
    on_cancel: EventHandler<()>,
) -> Element {
    let scope = use_view_scope();
    let mut api = use_api();
    let mut session = use_signal({
        let note_id = note_id.clone();
        move || NoteSession::new(note_id, scope)
    });
    let mut busy = use_signal(|| false);

    let mut run = move |password: Option<DecryptionPassword>, unlock: bool| {
        let pending = {
            let mut current = session.write();
            match (password, unlock) {
                (Some(password), true) => current.begin_unlock(password),
                (password, _) => current.begin_load(password),
            }
        };
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
    };

    // One automatic attempt with the password from the link
    use_hook({
        let password = password.clone();
        move || run(password, false)
    });

    use_drop(move || {
        if let Ok(mut current) = session.try_write() {
            current.close();
        }
    });

    let state = session.read().state().clone();
    match state {
        ViewState::Loading => rsx! {
            div { class: "view-placeholder", "Loading..." }
        },
        ViewState::Locked { note, error } => rsx! {
            h1 { "Edit note" }
            DecryptPrompt {
                title: note.map(|n| n.title),
                error,
                busy: busy(),
                on_submit: move |value: String| run(DecryptionPassword::parse(&value), true),
            }
            button { class: "btn", onclick: move |_| on_cancel.call(()), "Cancel" }
        },
        ViewState::Unlocked(unlocked) => {
            let key = unlocked.id().to_string();
            rsx! {
                h1 { "Edit note" }
                NoteForm {
                    key: "{key}",
                    original: unlocked,
                    on_saved: on_saved,
                    on_cancel: on_cancel,
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
                        button { class: "btn", onclick: move |_| run(None, false), "Try again" }
                    }
                }
            }
        }
    }
}
