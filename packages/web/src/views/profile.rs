use dioxus::prelude::*;
use ui::views::ProfileView;

use crate::Route;

#[component]
pub fn Profile() -> Element {
    let nav = use_navigator();

    rsx! {
        ProfileView {
            on_account_deleted: move |_| {
                nav.replace(Route::Login {
                    registered: String::new(),
                });
            },
        }
    }
}
