//! # API crate: REST client for the secure notes service
//!
//! Everything that talks HTTP lives here. The client core in `notes` only
//! sees the [`notes::NoteStore`] trait, implemented by [`HttpNoteStore`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | `ClientConfig`: base URL, page size and reCAPTCHA site key, from TOML or the environment |
//! | [`client`] | `ApiClient`: reqwest client plus the bearer token, attached to every request |
//! | [`wire`] | Response decoding and status-to-error mapping |
//! | [`http_store`] | `HttpNoteStore`, the REST `NoteStore` |
//! | [`accounts`] | Login, registration, profile and account deletion, with form validation |
//!
//! Errors on note calls are [`notes::StoreError`]; account calls return
//! [`ApiError`], which adds client-side validation failures.

pub mod accounts;
pub mod client;
pub mod config;
mod error;
pub mod http_store;
pub mod wire;

pub use accounts::{
    validate_login, validate_profile_update, validate_registration, AuthToken, LoginForm,
    RegisterRequest, UpdateUserRequest, User,
};
pub use client::ApiClient;
pub use config::{ClientConfig, RecaptchaConfig};
pub use error::ApiError;
pub use http_store::HttpNoteStore;
