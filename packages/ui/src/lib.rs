//! This crate contains all shared UI for the workspace.
//!
//! Components talk to the note service through [`use_api`] and run their
//! requests under a [`use_view_scope`] scope, so nothing is written into a
//! component after it unmounts.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod views;

mod auth;
pub use auth::{use_api, use_auth, ApiHandle, AuthProvider, AuthState, LogoutButton};

mod scope;
pub use scope::use_view_scope;

pub mod activity_log;
pub use activity_log::{
    log_activity, log_note_activity, use_activity_log, use_activity_log_provider, ActivityLog,
    LogLevel,
};

mod activity_log_panel;
pub use activity_log_panel::{ActivityLogPanel, ActivityLogToggle};

pub mod recaptcha;
pub use recaptcha::{CaptchaToken, ReCaptcha};

mod sensitivity_badge;
pub use sensitivity_badge::SensitivityBadge;

mod note_card;
pub use note_card::{format_timestamp, NoteCard};

mod decrypt_prompt;
pub use decrypt_prompt::DecryptPrompt;

mod note_viewer;
pub use note_viewer::NoteViewer;

mod note_form;
pub use note_form::NoteForm;
