//! # Accounts: sign-in, registration and the current user
//!
//! Login uses the OAuth2 password flow (form-encoded `username`/`password`)
//! and yields an [`AuthToken`]. All other calls go through an [`ApiClient`]
//! carrying that token.
//!
//! Form input is checked client-side by the `validate_*` functions before any
//! request is made; the service validates again.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::wire;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Bearer token issued at login. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// `None` for a blank token.
    pub fn new(token: String) -> Option<Self> {
        let token = token.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub created_at: f64,
    pub updated_at: f64,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub recaptcha_token: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
}

/// Only the fields that are set are sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn invalid(msg: &str) -> ApiError {
    ApiError::Validation(msg.to_string())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("Please enter a valid email address")),
    }
}

fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_login(form: &LoginForm) -> Result<(), ApiError> {
    if form.username.trim().is_empty() {
        return Err(invalid("Username is required"));
    }
    if form.password.is_empty() {
        return Err(invalid("Password is required"));
    }
    Ok(())
}

/// `consent` is the data protection checkbox.
pub fn validate_registration(request: &RegisterRequest, consent: bool) -> Result<(), ApiError> {
    if request.username.trim().chars().count() < MIN_USERNAME_CHARS {
        return Err(ApiError::Validation(format!(
            "Username must be at least {MIN_USERNAME_CHARS} characters"
        )));
    }
    validate_email(&request.email)?;
    validate_new_password(&request.password)?;
    if !consent {
        return Err(invalid(
            "You must agree to the data protection policy to create an account",
        ));
    }
    Ok(())
}

/// A blank password leaves the current one unchanged.
pub fn validate_profile_update(
    request: &UpdateUserRequest,
    confirm_password: &str,
) -> Result<(), ApiError> {
    if let Some(email) = &request.email {
        validate_email(email)?;
    }
    if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
        validate_new_password(password)?;
        if password != confirm_password {
            return Err(invalid("Passwords do not match"));
        }
    }
    Ok(())
}

/// Form fields for the token endpoint. The captcha token is sent only when
/// the widget produced one.
fn login_fields(form: &LoginForm) -> Vec<(&'static str, &str)> {
    let mut fields = vec![
        ("username", form.username.trim()),
        ("password", form.password.as_str()),
    ];
    if let Some(token) = form.recaptcha_token.as_deref().filter(|t| !t.is_empty()) {
        fields.push(("recaptcha_token", token));
    }
    fields
}

impl ApiClient {
    /// Exchange credentials for a token.
    pub async fn login(&self, form: &LoginForm) -> Result<AuthToken, ApiError> {
        validate_login(form)?;
        let fields = login_fields(form);
        debug!(username = form.username.trim(), "logging in");
        let request = self.request(Method::POST, "/auth/login").form(&fields);
        let body = self.send(request).await?;
        Ok(wire::parse_token(&body)?)
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
        consent: bool,
    ) -> Result<User, ApiError> {
        validate_registration(request, consent)?;
        let payload = RegisterRequest {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password: request.password.clone(),
            full_name: request
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            recaptcha_token: request.recaptcha_token.clone(),
        };
        debug!(username = %payload.username, "registering");
        let body = self.send_json(Method::POST, "/users", &payload).await?;
        Ok(wire::parse_user(&body)?)
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let body = self.send(self.request(Method::GET, "/users/me")).await?;
        Ok(wire::parse_user(&body)?)
    }

    pub async fn update_user(
        &self,
        request: &UpdateUserRequest,
        confirm_password: &str,
    ) -> Result<User, ApiError> {
        validate_profile_update(request, confirm_password)?;
        let payload = UpdateUserRequest {
            email: request.email.as_deref().map(|e| e.trim().to_string()),
            full_name: request.full_name.clone(),
            password: request.password.clone().filter(|p| !p.is_empty()),
        };
        let body = self.send_json(Method::PUT, "/users/me", &payload).await?;
        Ok(wire::parse_user(&body)?)
    }

    /// Delete the account, then try to revoke the token. A failed revoke is
    /// logged and ignored since the account is already gone.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, "/users/me")).await?;
        if let Err(err) = self.logout().await {
            warn!("account deleted but token revoke failed: {err}");
        }
        Ok(())
    }

    /// Ask the service to blacklist the current token.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let Some(token) = self.token() else {
            return Ok(());
        };
        let payload = serde_json::json!({ "token": token.expose() });
        self.send_json(Method::POST, "/auth/logout", &payload)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "correct horse".into(),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn registration_rules() {
        assert_eq!(validate_registration(&registration(), true), Ok(()));

        let short_name = RegisterRequest {
            username: " al ".into(),
            ..registration()
        };
        assert!(validate_registration(&short_name, true).is_err());

        let bad_email = RegisterRequest {
            email: "alice.example.com".into(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&bad_email, true),
            Err(ApiError::Validation(
                "Please enter a valid email address".into()
            ))
        );

        let short_password = RegisterRequest {
            password: "1234567".into(),
            ..registration()
        };
        assert!(validate_registration(&short_password, true).is_err());

        assert!(validate_registration(&registration(), false).is_err());
    }

    #[test]
    fn profile_password_is_optional_but_must_match() {
        let keep = UpdateUserRequest {
            email: Some("a@b.c".into()),
            password: Some(String::new()),
            ..UpdateUserRequest::default()
        };
        assert_eq!(validate_profile_update(&keep, ""), Ok(()));

        let change = UpdateUserRequest {
            password: Some("new password".into()),
            ..UpdateUserRequest::default()
        };
        assert_eq!(validate_profile_update(&change, "new password"), Ok(()));
        assert_eq!(
            validate_profile_update(&change, "new passw0rd"),
            Err(ApiError::Validation("Passwords do not match".into()))
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            username: "  ".into(),
            password: "pw".into(),
            recaptcha_token: None,
        };
        assert!(validate_login(&form).is_err());
    }

    #[test]
    fn login_sends_captcha_token_only_when_present() {
        let mut form = LoginForm {
            username: " alice ".into(),
            password: "pw".into(),
            recaptcha_token: None,
        };
        assert_eq!(
            login_fields(&form),
            vec![("username", "alice"), ("password", "pw")]
        );

        form.recaptcha_token = Some("captcha-token".into());
        assert_eq!(
            login_fields(&form),
            vec![
                ("username", "alice"),
                ("password", "pw"),
                ("recaptcha_token", "captcha-token"),
            ]
        );

        form.recaptcha_token = Some(String::new());
        assert_eq!(login_fields(&form).len(), 2);
    }

    #[test]
    fn registration_payload_carries_captcha_token_when_set() {
        let json = serde_json::to_value(registration()).unwrap();
        assert!(json.get("recaptcha_token").is_none());
        assert!(json.get("full_name").is_none());

        let request = RegisterRequest {
            recaptcha_token: Some("captcha-token".into()),
            ..registration()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["recaptcha_token"], "captcha-token");
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn update_payload_omits_unset_fields() {
        let request = UpdateUserRequest {
            full_name: Some("Alice".into()),
            ..UpdateUserRequest::default()
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"full_name":"Alice"}"#
        );
    }

    #[test]
    fn token_is_trimmed_and_redacted() {
        assert!(AuthToken::new("   ".into()).is_none());
        let token = AuthToken::new(" abc ".into()).unwrap();
        assert_eq!(token.expose(), "abc");
        assert_eq!(format!("{token:?}"), "AuthToken(..)");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = User {
            id: "u1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: Some("  ".into()),
            created_at: 0.0,
            updated_at: 0.0,
        };
        assert_eq!(user.display_name(), "alice");
        user.full_name = Some("Alice Liddell".into());
        assert_eq!(user.display_name(), "Alice Liddell");
    }
}
