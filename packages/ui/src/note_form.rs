use api::HttpNoteStore;
use dioxus::prelude::*;
use notes::{save, EncryptionIntent, Note, SaveError, UnlockedNote};

use crate::{
    log_activity, log_note_activity, use_activity_log, use_api, use_view_scope, LogLevel,
};

/// Create or edit form.
///
/// `original` is the note being edited, unlocked with the password that opened
/// it when it is encrypted. Leave it out to create a new note.
#[component]
pub fn NoteForm(
    original: Option<UnlockedNote>,
    on_saved: EventHandler<Note>,
    on_cancel: EventHandler<()>,
) -> Element {
    let scope = use_view_scope();
    let mut api = use_api();
    let mut activity_log = use_activity_log();

    let was_encrypted = original.as_ref().is_some_and(|n| n.note().is_encrypted);
    let mut title = use_signal({
        let initial = original.as_ref().map(|n| n.note().title.clone());
        move || initial.unwrap_or_default()
    });
    let mut content = use_signal({
        let initial = original.as_ref().map(|n| n.content().to_string());
        move || initial.unwrap_or_default()
    });
    let mut encrypt = use_signal(|| was_encrypted);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);

    let handle_submit = {
        let original = original.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if saving() {
                return;
            }
            error.set(None);
            let original = original.clone();
            let scope = scope.clone();
            let intent = EncryptionIntent::new(
                original.as_ref().map(UnlockedNote::note),
                encrypt(),
                &password(),
            );
            let (t, c) = (title(), content());
            saving.set(true);
            spawn(async move {
                let client = api.client();
                let store = HttpNoteStore::new(&client);
                let result = scope
                    .run(save(&store, original.as_ref(), &intent, &t, &c))
                    .await;
                let Ok(result) = result else {
                    return;
                };
                saving.set(false);
                match result {
                    Ok(outcome) => {
                        password.set(String::new());
                        let verb = if original.is_some() { "Saved" } else { "Created" };
                        log_note_activity(
                            &mut activity_log,
                            LogLevel::Success,
                            &outcome.note.id,
                            &format!("{verb} \"{}\"", outcome.note.title),
                        );
                        on_saved.call(outcome.note);
                    }
                    Err(SaveError::Unauthorized) => api.expire_session(),
                    Err(err) => {
                        if !err.is_validation() {
                            log_activity(&mut activity_log, LogLevel::Error, &format!("Save failed: {err}"));
                        }
                        error.set(Some(err.user_message()));
                    }
                }
            });
        }
    };

    let password_label = if was_encrypted {
        "New Encryption Password"
    } else {
        "Encryption Password"
    };
    let password_hint = if was_encrypted {
        "Enter a new password that will be used to encrypt your note. Saving re-encrypts it as a new copy and removes the old one."
    } else {
        "You will need this password to view the note later. It cannot be recovered."
    };

    rsx! {
        form {
            class: "note-form",
            onsubmit: handle_submit,

            if let Some(err) = error() {
                div { class: "form-error-banner", "{err}" }
            }

            label { r#for: "title", "Title" }
            input {
                id: "title",
                r#type: "text",
                maxlength: "100",
                value: title(),
                oninput: move |evt: FormEvent| title.set(evt.value()),
            }

            label { r#for: "content", "Content" }
            textarea {
                id: "content",
                rows: "12",
                value: content(),
                oninput: move |evt: FormEvent| content.set(evt.value()),
            }

            div {
                class: "form-row",
                input {
                    id: "is_encrypted",
                    r#type: "checkbox",
                    checked: encrypt(),
                    onchange: move |evt: FormEvent| encrypt.set(evt.checked()),
                }
                label { r#for: "is_encrypted", "Encrypt this note" }
            }
            p { class: "muted", "Encrypting your note will require a password to view it later" }

            if encrypt() {
                label { r#for: "encryption_password", "{password_label}" }
                input {
                    id: "encryption_password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                p { class: "muted", "{password_hint}" }
            }

            div {
                class: "form-actions",
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: saving(),
                    if saving() { "Saving..." } else { "Save" }
                }
            }
        }
    }
}
