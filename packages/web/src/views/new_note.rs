use dioxus::prelude::*;
use notes::Note;
use ui::NoteForm;

use crate::Route;

#[component]
pub fn NewNote() -> Element {
    let nav = use_navigator();

    rsx! {
        section {
            class: "note-page",
            h1 { "New note" }
            NoteForm {
                on_saved: move |_note: Note| {
                    nav.replace(Route::Notes {});
                },
                on_cancel: move |_| {
                    nav.push(Route::Notes {});
                },
            }
        }
    }
}
