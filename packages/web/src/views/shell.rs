use dioxus::prelude::*;

use ui::icons::FaNoteSticky;
use ui::{use_auth, ActivityLogPanel, ActivityLogToggle, Icon, LogoutButton};

use crate::Route;

/// Layout for every page that needs a signed-in user.
#[component]
pub fn AppShell() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    let state = auth();
    let signed_out = !state.loading && !state.is_signed_in();
    use_effect(move || {
        let state = auth();
        if !state.loading && !state.is_signed_in() {
            tracing::debug!("no session, redirecting to login");
            nav.replace(Route::Login {
                registered: String::new(),
            });
        }
    });

    if state.loading || signed_out {
        return rsx! {
            div { class: "view-placeholder", "Loading..." }
        };
    }

    let name = state
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();

    rsx! {
        header {
            class: "app-header",
            Link {
                class: "app-brand",
                to: Route::Notes {},
                Icon { icon: FaNoteSticky, width: 16, height: 16 }
                " Secure Notes"
            }
            nav {
                class: "app-nav",
                Link { to: Route::Notes {}, "My Notes" }
                Link { to: Route::Profile {}, "{name}" }
                ActivityLogToggle {}
                LogoutButton {
                    class: "btn btn-ghost",
                    on_logged_out: move |_| {
                        nav.replace(Route::Login {
                            registered: String::new(),
                        });
                    },
                }
            }
        }

        main {
            class: "app-main",
            Outlet::<Route> {}
        }

        ActivityLogPanel {
            on_open_note: move |id: String| {
                nav.push(Route::NoteDetail { id });
            },
        }
    }
}
