//! Google reCAPTCHA v2 widget for the sign-in and registration forms.
//!
//! The widget only appears when a site key is configured. Tokens reach Rust
//! through a long-lived `document::eval` bridge; an expired or failed
//! challenge arrives as an empty string and clears the token.

use dioxus::prelude::*;

const RECAPTCHA_JS: &str = "https://www.google.com/recaptcha/api.js?render=explicit";

/// The service rejects tokens older than two minutes; leave some slack.
pub const TOKEN_LIFETIME_MS: f64 = 110_000.0;

pub const CAPTCHA_REQUIRED: &str = "Please complete the reCAPTCHA verification";

static WIDGET_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// A solved challenge and when it was solved.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptchaToken {
    token: String,
    received_ms: f64,
}

impl CaptchaToken {
    /// `None` for the empty token sent on expiry or error.
    pub fn received(token: String, received_ms: f64) -> Option<Self> {
        (!token.is_empty()).then_some(Self { token, received_ms })
    }

    pub fn is_fresh(&self, now_ms: f64) -> bool {
        now_ms - self.received_ms < TOKEN_LIFETIME_MS
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// The token to send with a sign-in form. Without a site key no captcha is
/// required; with one, a fresh token must be present.
pub fn captcha_for_submit(
    site_key: Option<&str>,
    token: Option<&CaptchaToken>,
    now_ms: f64,
) -> Result<Option<String>, &'static str> {
    if site_key.is_none() {
        return Ok(None);
    }
    match token {
        Some(token) if token.is_fresh(now_ms) => Ok(Some(token.token.clone())),
        _ => Err(CAPTCHA_REQUIRED),
    }
}

/// Milliseconds since the epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

fn js_string_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003c"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Loads the reCAPTCHA script once, renders the widget into `container_id`
/// and forwards every callback through `dioxus.send`.
fn render_script(container_id: &str, site_key: &str) -> String {
    format!(
        r#"(function() {{
            if (!document.getElementById('recaptcha-script')) {{
                var script = document.createElement('script');
                script.id = 'recaptcha-script';
                script.src = {src_js};
                script.async = true;
                script.defer = true;
                document.head.appendChild(script);
            }}
            var timer = setInterval(function() {{
                if (typeof grecaptcha === 'undefined' || !grecaptcha.render) return;
                clearInterval(timer);
                var container = document.getElementById({id_js});
                if (!container || container.dataset.rendered) return;
                container.dataset.rendered = '1';
                grecaptcha.render(container, {{
                    sitekey: {key_js},
                    callback: function(token) {{ dioxus.send(token); }},
                    'expired-callback': function() {{ dioxus.send(''); }},
                    'error-callback': function() {{ dioxus.send(''); }}
                }});
            }}, 100);
        }})();"#,
        src_js = js_string_escape(RECAPTCHA_JS),
        id_js = js_string_escape(container_id),
        key_js = js_string_escape(site_key),
    )
}

/// Renders a fresh widget. Remount it with a new `key` to reset the
/// challenge after a failed submit.
#[component]
pub fn ReCaptcha(site_key: String, on_token: EventHandler<Option<CaptchaToken>>) -> Element {
    let container_id = use_hook(|| {
        let n = WIDGET_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("recaptcha-{n}")
    });

    use_effect({
        let container_id = container_id.clone();
        move || {
            let js = render_script(&container_id, &site_key);
            spawn(async move {
                let mut eval = document::eval(&js);
                while let Ok(token) = eval.recv::<String>().await {
                    tracing::debug!(solved = !token.is_empty(), "captcha callback");
                    on_token.call(CaptchaToken::received(token, now_ms()));
                }
            });
        }
    });

    rsx! {
        div { id: "{container_id}", class: "recaptcha" }
    }
}
