use dioxus::prelude::*;

use crate::icons::FaLock;
use crate::Icon;

/// Password form for a locked note.
#[component]
pub fn DecryptPrompt(
    /// Unknown when the only fetch so far was a failed unlock.
    title: Option<String>,
    error: Option<String>,
    #[props(default)] busy: bool,
    on_submit: EventHandler<String>,
) -> Element {
    let mut password = use_signal(String::new);
    let mut missing = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let value = password();
        if value.trim().is_empty() {
            missing.set(true);
            return;
        }
        missing.set(false);
        password.set(String::new());
        on_submit.call(value);
    };

    let message = if missing() {
        Some("Please enter the password".to_string())
    } else {
        error
    };

    rsx! {
        div {
            class: "decrypt-prompt",
            div {
                class: "decrypt-prompt-header",
                Icon { icon: FaLock, width: 16, height: 16 }
                h2 {
                    if let Some(title) = title {
                        "{title}"
                    } else {
                        "Encrypted note"
                    }
                }
            }
            p { class: "muted", "This note is encrypted. Enter its password to view the content." }
            form {
                onsubmit: handle_submit,
                class: "form-row",
                input {
                    r#type: "password",
                    placeholder: "Password",
                    autocomplete: "off",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: busy,
                    if busy { "Decrypting..." } else { "Decrypt" }
                }
            }
            if let Some(message) = message {
                p { class: "form-error", "{message}" }
            }
        }
    }
}
