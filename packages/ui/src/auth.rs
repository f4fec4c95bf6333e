//! Authentication context and hooks for the UI.
//!
//! [`AuthProvider`] owns the signed-in user and the bearer token. Components
//! reach the note service through [`use_api`], whose [`ApiHandle::client`]
//! always carries the current token. The token survives reloads through
//! `localStorage` on the web; decryption passwords are never stored.

use api::{ApiClient, AuthToken, ClientConfig, User};
use dioxus::prelude::*;

const TOKEN_KEY: &str = "access_token";

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<AuthToken>,
    /// True until the stored token has been checked.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Get the current authentication state.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Access to the note service for event handlers and tasks.
#[derive(Clone, Copy, PartialEq)]
pub struct ApiHandle {
    auth: Signal<AuthState>,
    base: Signal<ApiClient>,
    config: Signal<ClientConfig>,
}

impl ApiHandle {
    /// A client carrying the token as of this call.
    pub fn client(&self) -> ApiClient {
        match self.auth.peek().token.clone() {
            Some(token) => self.base.peek().with_token(token),
            None => self.base.peek().without_token(),
        }
    }

    pub fn page(&self, skip: u32) -> notes::Page {
        self.config.peek().page(skip)
    }

    /// Site key for the captcha widget; `None` when sign-in needs no captcha.
    pub fn recaptcha_site_key(&self) -> Option<String> {
        self.config.peek().recaptcha_site_key().map(str::to_string)
    }

    pub fn sign_in(&mut self, token: AuthToken, user: User) {
        save_token(Some(&token));
        self.auth.set(AuthState {
            user: Some(user),
            token: Some(token),
            loading: false,
        });
    }

    pub fn set_user(&mut self, user: User) {
        self.auth.write().user = Some(user);
    }

    /// Drop the token locally, after logout, account deletion, or when the
    /// service reports it as no longer valid.
    pub fn sign_out(&mut self) {
        save_token(None);
        self.auth.set(AuthState {
            user: None,
            token: None,
            loading: false,
        });
    }

    pub fn expire_session(&mut self) {
        tracing::warn!("session rejected by the note service, signing out");
        self.sign_out();
    }
}

pub fn use_api() -> ApiHandle {
    use_context::<ApiHandle>()
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);
    let base = use_signal(|| ApiClient::new(&ClientConfig::from_env()));
    let config = use_signal(ClientConfig::from_env);
    let handle = use_context_provider(|| ApiHandle {
        auth: auth_state,
        base,
        config,
    });
    use_context_provider(|| auth_state);

    // Check the stored token on mount
    let _ = use_resource(move || async move {
        let Some(token) = load_token() else {
            auth_state.set(AuthState {
                loading: false,
                ..AuthState::default()
            });
            return;
        };
        let client = handle.base.peek().with_token(token.clone());
        match client.current_user().await {
            Ok(user) => auth_state.set(AuthState {
                user: Some(user),
                token: Some(token),
                loading: false,
            }),
            Err(err) if err.is_unauthorized() => {
                tracing::debug!("stored token rejected");
                save_token(None);
                auth_state.set(AuthState {
                    loading: false,
                    ..AuthState::default()
                });
            }
            Err(err) => {
                // Keep the token; the service may just be unreachable.
                tracing::warn!("could not load current user: {err}");
                auth_state.set(AuthState {
                    user: None,
                    token: Some(token),
                    loading: false,
                });
            }
        }
    });

    rsx! {
        {children}
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    on_logged_out: EventHandler<()>,
) -> Element {
    let mut api = use_api();

    let onclick = move |_| async move {
        if let Err(err) = api.client().logout().await {
            tracing::warn!("logout request failed: {err}");
        }
        api.sign_out();
        on_logged_out.call(());
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
fn load_token() -> Option<AuthToken> {
    let value = storage()?.get_item(TOKEN_KEY).ok()??;
    AuthToken::new(value)
}

#[cfg(target_arch = "wasm32")]
fn save_token(token: Option<&AuthToken>) {
    let Some(storage) = storage() else {
        return;
    };
    let result = match token {
        Some(token) => storage.set_item(TOKEN_KEY, token.expose()),
        None => storage.remove_item(TOKEN_KEY),
    };
    if result.is_err() {
        tracing::warn!("could not update {TOKEN_KEY} in localStorage");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_token() -> Option<AuthToken> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn save_token(_token: Option<&AuthToken>) {
    tracing::trace!("token persistence is web-only ({TOKEN_KEY})");
}
