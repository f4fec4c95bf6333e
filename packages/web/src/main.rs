use dioxus::prelude::*;

use ui::{use_activity_log_provider, AuthProvider};
use views::{
    AppShell, EditNote, Login, NewNote, NoteDetail, Notes, PrivacyPolicy, Profile, Register,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/auth/login?:registered")]
    Login { registered: String },
    #[route("/auth/register")]
    Register {},
    #[route("/privacy-policy")]
    PrivacyPolicy {},
    #[layout(AppShell)]
        #[route("/notes")]
        Notes {},
        #[route("/notes/new")]
        NewNote {},
        #[route("/notes/:id")]
        NoteDetail { id: String },
        #[route("/notes/:id/edit?:password")]
        EditNote { id: String, password: String },
        #[route("/profile")]
        Profile {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    use_activity_log_provider();

    rsx! {
        document::Title { "Secure Notes" }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Redirect `/` to `/notes`; the shell sends signed-out users on to login.
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Notes {});
    rsx! {}
}
