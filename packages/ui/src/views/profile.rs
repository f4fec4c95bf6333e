use api::{UpdateUserRequest, User};
use dioxus::prelude::*;

use crate::views::ModalOverlay;
use crate::{log_activity, use_activity_log, use_api, use_auth, LogLevel};

/// Account details, profile update and account deletion.
#[component]
pub fn ProfileView(on_account_deleted: EventHandler<()>) -> Element {
    let auth = use_auth();
    let mut api = use_api();
    let mut activity_log = use_activity_log();

    let user = auth().user;
    let mut email = use_signal({
        let initial = user.as_ref().map(|u| u.email.clone());
        move || initial.unwrap_or_default()
    });
    let mut full_name = use_signal({
        let initial = user.as_ref().and_then(|u| u.full_name.clone());
        move || initial.unwrap_or_default()
    });
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);
    let mut confirm_delete = use_signal(|| false);

    // The user may arrive after the first render
    use_effect(move || {
        if let Some(user) = auth().user {
            if email.peek().is_empty() {
                email.set(user.email.clone());
            }
            if full_name.peek().is_empty() {
                full_name.set(user.full_name.unwrap_or_default());
            }
        }
    });

    let handle_update = move |evt: FormEvent| {
        evt.prevent_default();
        error.set(None);
        notice.set(None);
        let request = UpdateUserRequest {
            email: Some(email()),
            full_name: Some(full_name().trim().to_string()).filter(|n| !n.is_empty()),
            password: Some(password()).filter(|p| !p.is_empty()),
        };
        let confirm = confirm_password();
        saving.set(true);
        spawn(async move {
            match api.client().update_user(&request, &confirm).await {
                Ok(user) => {
                    password.set(String::new());
                    confirm_password.set(String::new());
                    api.set_user(user);
                    log_activity(&mut activity_log, LogLevel::Success, "Profile updated");
                    notice.set(Some("Profile updated successfully".to_string()));
                }
                Err(err) if err.is_unauthorized() => api.expire_session(),
                Err(err) => error.set(Some(err.user_message())),
            }
            saving.set(false);
        });
    };

    let handle_delete = move |_| {
        confirm_delete.set(false);
        spawn(async move {
            match api.client().delete_account().await {
                Ok(()) => {
                    api.sign_out();
                    on_account_deleted.call(());
                }
                Err(err) if err.is_unauthorized() => api.expire_session(),
                Err(err) => error.set(Some(err.user_message())),
            }
        });
    };

    let Some(User { username, created_at, .. }) = user else {
        return rsx! {
            div { class: "view-placeholder", "Loading..." }
        };
    };
    let member_since = crate::format_timestamp(created_at);

    rsx! {
        section {
            class: "profile",
            h1 { "Profile" }
            p { class: "muted", "Signed in as {username}, member since {member_since}" }

            form {
                class: "note-form",
                onsubmit: handle_update,

                if let Some(err) = error() {
                    div { class: "form-error-banner", "{err}" }
                }
                if let Some(msg) = notice() {
                    div { class: "form-notice", "{msg}" }
                }

                label { r#for: "email", "Email" }
                input {
                    id: "email",
                    r#type: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                label { r#for: "full_name", "Full name" }
                input {
                    id: "full_name",
                    r#type: "text",
                    value: full_name(),
                    oninput: move |evt: FormEvent| full_name.set(evt.value()),
                }

                label { r#for: "password", "New password" }
                input {
                    id: "password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                p { class: "muted", "Leave blank to keep your current password" }

                label { r#for: "confirm_password", "Confirm new password" }
                input {
                    id: "confirm_password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: confirm_password(),
                    oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                }

                div {
                    class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Update profile" }
                    }
                }
            }

            div {
                class: "danger-zone",
                h2 { "Delete account" }
                p { class: "muted", "This permanently deletes your account and all of your notes." }
                button {
                    class: "btn btn-danger",
                    onclick: move |_| confirm_delete.set(true),
                    "Delete account"
                }
            }

            if confirm_delete() {
                ModalOverlay {
                    on_close: move |_| confirm_delete.set(false),
                    div {
                        class: "modal-body",
                        h2 { "Delete your account?" }
                        p { "This action cannot be undone." }
                        div {
                            class: "form-actions",
                            button { class: "btn", onclick: move |_| confirm_delete.set(false), "Cancel" }
                            button { class: "btn btn-danger", onclick: handle_delete, "Delete" }
                        }
                    }
                }
            }
        }
    }
}
