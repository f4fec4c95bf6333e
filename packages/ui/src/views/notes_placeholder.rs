use dioxus::prelude::*;

/// Empty state for the notes list.
#[component]
pub fn NotesPlaceholder(searching: bool, on_new: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "view-placeholder",
            if searching {
                h2 { "No matching notes" }
                p { class: "muted", "Try a different search. Encrypted notes only match on their title." }
            } else {
                h2 { "No notes yet" }
                p { class: "muted", "Create your first note to get started." }
                button { class: "btn btn-primary", onclick: move |_| on_new.call(()), "New note" }
            }
        }
    }
}
