use dioxus::prelude::*;

use crate::activity_log::{use_activity_log, LogEntry, LogLevel};
use crate::icons::{
    FaArrowUpRightFromSquare, FaCircleCheck, FaCircleInfo, FaCircleXmark, FaClockRotateLeft,
    FaTriangleExclamation, FaXmark,
};
use crate::Icon;

#[component]
fn LevelIcon(level: LogLevel) -> Element {
    match level {
        LogLevel::Info => rsx! { Icon { icon: FaCircleInfo, width: 12, height: 12 } },
        LogLevel::Success => rsx! { Icon { icon: FaCircleCheck, width: 12, height: 12 } },
        LogLevel::Warning => rsx! { Icon { icon: FaTriangleExclamation, width: 12, height: 12 } },
        LogLevel::Error => rsx! { Icon { icon: FaCircleXmark, width: 12, height: 12 } },
    }
}

#[component]
fn ActivityEntry(entry: LogEntry, on_open_note: EventHandler<String>) -> Element {
    let LogEntry {
        timestamp,
        level,
        message,
        note_id,
    } = entry;
    let level_class = level.class();

    rsx! {
        li {
            class: "activity-log-entry {level_class}",
            LevelIcon { level }
            time { class: "activity-log-time", "{timestamp}" }
            span { class: "activity-log-message", "{message}" }
            if let Some(id) = note_id {
                button {
                    class: "activity-log-open",
                    title: "Open note",
                    onclick: move |_| on_open_note.call(id.clone()),
                    Icon { icon: FaArrowUpRightFromSquare, width: 11, height: 11 }
                }
            }
        }
    }
}

/// Slide-over list of recent note events. Entries that refer to a note link
/// back to it through `on_open_note`.
#[component]
pub fn ActivityLogPanel(on_open_note: EventHandler<String>) -> Element {
    let mut log = use_activity_log();

    let current = log.read();
    if !current.visible {
        return rsx! {};
    }
    let entries: Vec<LogEntry> = current.newest_first().cloned().collect();
    let errors = current.error_count();
    let entries_empty = entries.is_empty();
    drop(current);

    let open_note = move |id: String| {
        log.write().visible = false;
        on_open_note.call(id);
    };

    rsx! {
        aside {
            class: "activity-log-panel",
            header {
                class: "activity-log-header",
                span { "Recent activity" }
                if errors > 0 {
                    span { class: "badge badge-high", "{errors} failed" }
                }
                div {
                    class: "activity-log-header-actions",
                    button {
                        class: "btn btn-ghost",
                        disabled: entries_empty,
                        onclick: move |_| log.write().entries.clear(),
                        "Clear"
                    }
                    button {
                        class: "btn btn-ghost",
                        title: "Close",
                        onclick: move |_| log.write().visible = false,
                        Icon { icon: FaXmark, width: 12, height: 12 }
                    }
                }
            }
            if entries_empty {
                p { class: "muted activity-log-empty", "Nothing yet." }
            } else {
                ol {
                    class: "activity-log-entries",
                    for (i, entry) in entries.into_iter().enumerate() {
                        ActivityEntry { key: "{i}", entry, on_open_note: open_note }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ActivityLogToggle() -> Element {
    let mut log = use_activity_log();
    let count = log.read().entries.len();
    let has_errors = log.read().has_errors();

    rsx! {
        button {
            class: "activity-log-toggle",
            class: if has_errors { "has-errors" },
            title: "Recent activity",
            onclick: move |_| log.write().toggle(),
            Icon { icon: FaClockRotateLeft, width: 14, height: 14 }
            if count > 0 {
                " {count}"
            }
        }
    }
}
