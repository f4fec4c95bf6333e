use api::LoginForm;
use dioxus::prelude::*;
use ui::recaptcha::{captcha_for_submit, now_ms};
use ui::{log_activity, use_activity_log, use_api, use_auth, CaptchaToken, LogLevel, ReCaptcha};

use crate::Route;

/// Sign-in page. `registered` carries the username after a successful
/// registration.
#[component]
pub fn Login(registered: String) -> Element {
    let auth = use_auth();
    let mut api = use_api();
    let nav = use_navigator();
    let mut activity_log = use_activity_log();

    let mut username = use_signal({
        let registered = registered.clone();
        move || registered
    });
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);
    let site_key = use_signal(|| api.recaptcha_site_key());
    let mut captcha = use_signal(|| Option::<CaptchaToken>::None);
    // Bumped to remount the widget after a failed attempt
    let mut captcha_round = use_signal(|| 0u32);

    // Already signed in
    use_effect(move || {
        if auth().is_signed_in() {
            nav.replace(Route::Notes {});
        }
    });

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        error.set(None);
        let recaptcha_token = match captcha_for_submit(
            site_key.peek().as_deref(),
            captcha.peek().as_ref(),
            now_ms(),
        ) {
            Ok(token) => token,
            Err(message) => {
                error.set(Some(message.to_string()));
                return;
            }
        };
        let form = LoginForm {
            username: username(),
            password: password(),
            recaptcha_token,
        };
        submitting.set(true);
        spawn(async move {
            let client = api.client();
            let signed_in = async {
                let token = client.login(&form).await?;
                let user = client.with_token(token.clone()).current_user().await?;
                Ok::<_, api::ApiError>((token, user))
            };
            match signed_in.await {
                Ok((token, user)) => {
                    log_activity(
                        &mut activity_log,
                        LogLevel::Success,
                        &format!("Signed in as {}", user.username),
                    );
                    api.sign_in(token, user);
                    nav.replace(Route::Notes {});
                }
                Err(err) => {
                    tracing::debug!("login failed: {err}");
                    password.set(String::new());
                    captcha.set(None);
                    captcha_round += 1;
                    error.set(Some(err.user_message()));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-page",
            form {
                class: "auth-card",
                onsubmit: handle_submit,
                h1 { "Sign in" }

                if !registered.is_empty() {
                    div { class: "form-notice", "Registration successful. Please sign in." }
                }
                if let Some(err) = error() {
                    div { class: "form-error-banner", "{err}" }
                }

                label { r#for: "username", "Username" }
                input {
                    id: "username",
                    r#type: "text",
                    autocomplete: "username",
                    value: username(),
                    oninput: move |evt: FormEvent| username.set(evt.value()),
                }

                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    autocomplete: "current-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }

                if let Some(key) = site_key() {
                    ReCaptcha {
                        key: "{captcha_round}",
                        site_key: key,
                        on_token: move |token| captcha.set(token),
                    }
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }

                p {
                    class: "muted",
                    "No account yet? "
                    Link { to: Route::Register {}, "Create one" }
                }
            }
        }
    }
}
