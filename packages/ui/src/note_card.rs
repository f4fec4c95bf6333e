use dioxus::prelude::*;
use notes::Note;

use crate::icons::{FaLock, FaTrashCan};
use crate::{Icon, SensitivityBadge};

const PREVIEW_CHARS: usize = 140;

fn preview(note: &Note) -> String {
    if note.is_encrypted {
        return "Encrypted content".to_string();
    }
    let mut text: String = note.content.chars().take(PREVIEW_CHARS).collect();
    if note.content.chars().count() > PREVIEW_CHARS {
        text.push_str("...");
    }
    text
}

/// One entry in the notes list.
#[component]
pub fn NoteCard(note: Note, on_open: EventHandler<String>, on_delete: EventHandler<Note>) -> Element {
    let id = note.id.clone();
    let body = preview(&note);
    let title = note.title.clone();
    let updated = format_timestamp(note.updated_at);

    rsx! {
        div {
            class: "note-card",
            onclick: move |_| on_open.call(id.clone()),
            div {
                class: "note-card-header",
                h3 {
                    if note.is_encrypted {
                        span { class: "note-card-lock", title: "Encrypted",
                            Icon { icon: FaLock, width: 12, height: 12 }
                        }
                    }
                    "{title}"
                }
                button {
                    class: "btn btn-ghost",
                    title: "Delete note",
                    onclick: {
                        let note = note.clone();
                        move |evt: MouseEvent| {
                            evt.stop_propagation();
                            on_delete.call(note.clone());
                        }
                    },
                    Icon { icon: FaTrashCan, width: 14, height: 14 }
                }
            }
            p { class: if note.is_encrypted { "note-card-body muted" } else { "note-card-body" }, "{body}" }
            div {
                class: "note-card-footer",
                span { class: "muted", "Updated {updated}" }
                if let Some(sensitivity) = note.sensitivity.clone() {
                    SensitivityBadge { sensitivity }
                }
            }
        }
    }
}

/// `YYYY-MM-DD` from unix seconds (UTC).
pub fn format_timestamp(secs: f64) -> String {
    chrono::DateTime::from_timestamp(secs.max(0.0) as i64, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
