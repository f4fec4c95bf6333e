use dioxus::prelude::*;
use notes::{handoff_password, Note};
use ui::views::NoteEditView;

use crate::Route;

/// `password` is the handoff from the note page, still carrying its inner
/// layer of percent-encoding. Empty when the user came here directly.
#[component]
pub fn EditNote(id: String, password: String) -> Element {
    let nav = use_navigator();

    rsx! {
        section {
            class: "note-page",
            NoteEditView {
                key: "{id}",
                note_id: id.clone(),
                password: handoff_password(&password),
                on_saved: move |_note: Note| {
                    nav.replace(Route::Notes {});
                },
                on_cancel: move |_| {
                    nav.go_back();
                },
            }
        }
    }
}
