use api::HttpNoteStore;
use dioxus::prelude::*;
use notes::{Note, NoteQuery, NoteStore, SortOrder, StoreError, ViewScope};

use crate::icons::FaPlus;
use crate::views::NotesPlaceholder;
use crate::{log_activity, use_activity_log, use_api, use_view_scope, ApiHandle, Icon, LogLevel, NoteCard};

#[derive(Clone, Copy)]
struct ListSignals {
    notes: Signal<Vec<Note>>,
    loading: Signal<bool>,
    has_more: Signal<bool>,
    error: Signal<Option<String>>,
}

fn load_page(skip: u32, scope: ViewScope, mut api: ApiHandle, mut list: ListSignals) {
    list.loading.set(true);
    list.error.set(None);
    spawn(async move {
        let client = api.client();
        let page = api.page(skip);
        let store = HttpNoteStore::new(&client);
        let Ok(result) = scope.run(store.list_notes(page)).await else {
            return;
        };
        list.loading.set(false);
        match result {
            Ok(batch) => {
                list.has_more.set(batch.len() as u32 == page.limit);
                if skip == 0 {
                    list.notes.set(batch);
                } else {
                    list.notes.write().extend(batch);
                }
            }
            Err(StoreError::Unauthorized) => api.expire_session(),
            Err(err) => {
                tracing::warn!("failed to list notes: {err}");
                list.error.set(Some("Failed to load notes. Please try again.".to_string()));
            }
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn confirm(_message: &str) -> bool {
    true
}

/// The signed-in user's notes with search, sort and paging.
#[component]
pub fn NotesListView(on_open: EventHandler<String>, on_new: EventHandler<()>) -> Element {
    let scope = use_view_scope();
    let mut api = use_api();
    let mut activity_log = use_activity_log();
    let list = ListSignals {
        notes: use_signal(Vec::new),
        loading: use_signal(|| true),
        has_more: use_signal(|| false),
        error: use_signal(|| None),
    };
    let mut search = use_signal(String::new);
    let mut sort = use_signal(SortOrder::default);

    use_effect({
        let scope = scope.clone();
        move || load_page(0, scope.clone(), api, list)
    });

    let load_more = {
        let scope = scope.clone();
        move |_| {
            let skip = list.notes.peek().len() as u32;
            load_page(skip, scope.clone(), api, list);
        }
    };

    let delete = move |note: Note| {
        if !confirm(&format!("Delete \"{}\"? This cannot be undone.", note.title)) {
            return;
        }
        let scope = scope.clone();
        let mut notes = list.notes;
        let mut error = list.error;
        spawn(async move {
            let client = api.client();
            let store = HttpNoteStore::new(&client);
            let Ok(result) = scope.run(store.delete_note(&note.id)).await else {
                return;
            };
            match result {
                Ok(()) => {
                    notes.write().retain(|n| n.id != note.id);
                    activity_log.write().forget_note(&note.id);
                    log_activity(&mut activity_log, LogLevel::Success, &format!("Deleted \"{}\"", note.title));
                }
                Err(StoreError::Unauthorized) => api.expire_session(),
                Err(err) => {
                    log_activity(&mut activity_log, LogLevel::Error, &format!("Delete failed: {err}"));
                    error.set(Some("Failed to delete note. Please try again.".to_string()));
                }
            }
        });
    };

    let query = NoteQuery {
        search: search(),
        sort: sort(),
    };
    let visible = query.apply(&list.notes.read());
    let searching = !query.search.trim().is_empty();
    let loading = (list.loading)();
    let has_more = (list.has_more)();

    rsx! {
        section {
            class: "notes-list",
            header {
                class: "notes-list-header",
                h1 { "My Notes" }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| on_new.call(()),
                    Icon { icon: FaPlus, width: 14, height: 14 }
                    " New note"
                }
            }

            div {
                class: "form-row",
                input {
                    r#type: "search",
                    placeholder: "Search notes...",
                    value: search(),
                    oninput: move |evt: FormEvent| search.set(evt.value()),
                }
                select {
                    value: sort().as_str(),
                    onchange: move |evt: FormEvent| sort.set(SortOrder::parse(&evt.value())),
                    for order in SortOrder::ALL {
                        option { value: order.as_str(), {order.label()} }
                    }
                }
            }

            if let Some(err) = (list.error)() {
                p { class: "form-error", "{err}" }
            }

            if visible.is_empty() && !loading {
                NotesPlaceholder { searching, on_new: on_new }
            }

            div {
                class: "notes-grid",
                for note in visible {
                    NoteCard {
                        key: "{note.id}",
                        note: note.clone(),
                        on_open: on_open,
                        on_delete: delete.clone(),
                    }
                }
            }

            if loading {
                p { class: "muted", "Loading..." }
            } else if has_more && !searching {
                button { class: "btn", onclick: load_more, "Load more" }
            }
        }
    }
}
