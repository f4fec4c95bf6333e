//! # Client configuration
//!
//! Where the note service lives and how much to fetch per page. The same
//! struct can be read from a TOML file or from the environment:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api/v1"
//!
//! [notes]
//! page_size = 10
//!
//! [recaptcha]
//! site_key = "6Lc..."
//! ```
//!
//! A missing or empty file is equivalent to the defaults. Without a reCAPTCHA
//! site key the sign-in forms send no captcha token. On native targets
//! [`ClientConfig::from_env`] loads `.env` with `dotenvy` and reads
//! `SECURE_NOTES_API_URL` and `SECURE_NOTES_RECAPTCHA_SITE_KEY`; on wasm the
//! variables are taken at compile time.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_VAR: &str = "SECURE_NOTES_API_URL";

/// Environment variable setting [`RecaptchaConfig::site_key`].
pub const RECAPTCHA_SITE_KEY_VAR: &str = "SECURE_NOTES_RECAPTCHA_SITE_KEY";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub recaptcha: RecaptchaConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Notes requested per list call, clamped to the service maximum.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// The service requires a captcha token on login and registration when this
/// is set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecaptchaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_key: Option<String>,
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    pub fn with_recaptcha_site_key(mut self, site_key: impl Into<String>) -> Self {
        self.recaptcha.site_key = Some(site_key.into());
        self
    }

    /// The configured site key, ignoring a blank one.
    pub fn recaptcha_site_key(&self) -> Option<&str> {
        self.recaptcha
            .site_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn page(&self, skip: u32) -> notes::Page {
        notes::Page::new(skip, self.notes.page_size)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Defaults, with the base URL and captcha key taken from the environment
    /// when set.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match key {
            API_URL_VAR => option_env!("SECURE_NOTES_API_URL").map(str::to_string),
            RECAPTCHA_SITE_KEY_VAR => {
                option_env!("SECURE_NOTES_RECAPTCHA_SITE_KEY").map(str::to_string)
            }
            _ => None,
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(key) = lookup(RECAPTCHA_SITE_KEY_VAR).filter(|key| !key.trim().is_empty()) {
            config = config.with_recaptcha_site_key(key.trim());
        }
        config
    }
}
