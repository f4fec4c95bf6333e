use dioxus::prelude::*;
use ui::views::NotesListView;

use crate::Route;

#[component]
pub fn Notes() -> Element {
    let nav = use_navigator();

    rsx! {
        NotesListView {
            on_open: move |id: String| {
                nav.push(Route::NoteDetail { id });
            },
            on_new: move |_| {
                nav.push(Route::NewNote {});
            },
        }
    }
}
