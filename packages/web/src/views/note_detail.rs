use dioxus::prelude::*;
use ui::NoteViewer;

use crate::Route;

#[component]
pub fn NoteDetail(id: String) -> Element {
    let nav = use_navigator();

    rsx! {
        Link { class: "back-link", to: Route::Notes {}, "Back to notes" }
        NoteViewer {
            note_id: id,
            // The edit path may carry the password, so it is pushed as a raw path
            on_edit: move |path: String| {
                nav.push(path);
            },
            on_deleted: move |_| {
                nav.replace(Route::Notes {});
            },
        }
    }
}
