use api::RegisterRequest;
use dioxus::prelude::*;
use ui::recaptcha::{captcha_for_submit, now_ms};
use ui::{use_api, CaptchaToken, ReCaptcha};

use crate::Route;

#[component]
pub fn Register() -> Element {
    let api = use_api();
    let nav = use_navigator();

    let mut username = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut full_name = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut consent = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);
    let site_key = use_signal(|| api.recaptcha_site_key());
    let mut captcha = use_signal(|| Option::<CaptchaToken>::None);
    let mut captcha_round = use_signal(|| 0u32);

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
        let request = RegisterRequest {
            username: username(),
            email: email(),
            password: password(),
            full_name: Some(full_name()),
            recaptcha_token,
        };
        let agreed = consent();
        submitting.set(true);
        spawn(async move {
            match api.client().register(&request, agreed).await {
                Ok(user) => {
                    tracing::info!(username = %user.username, "registered");
                    nav.push(Route::Login {
                        registered: user.username,
                    });
                }
                Err(err) => {
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
                h1 { "Create an account" }

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

                label { r#for: "email", "Email" }
                input {
                    id: "email",
                    r#type: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                label { r#for: "full_name", "Full name (optional)" }
                input {
                    id: "full_name",
                    r#type: "text",
                    value: full_name(),
                    oninput: move |evt: FormEvent| full_name.set(evt.value()),
                }

                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    autocomplete: "new-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                p { class: "muted", "At least 8 characters" }

                div {
                    class: "form-row",
                    input {
                        id: "consent",
                        r#type: "checkbox",
                        checked: consent(),
                        onchange: move |evt: FormEvent| consent.set(evt.checked()),
                    }
                    label {
                        r#for: "consent",
                        "I agree to the processing of my personal data according to the "
                        Link { to: Route::PrivacyPolicy {}, "privacy policy" }
                    }
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
                    if submitting() { "Creating account..." } else { "Create account" }
                }

                p {
                    class: "muted",
                    "Already registered? "
                    Link {
                        to: Route::Login {
                            registered: String::new(),
                        },
                        "Sign in"
                    }
                }
            }
        }
    }
}
