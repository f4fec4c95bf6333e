//! # notes: client core for password-protected notes
//!
//! Everything here is independent of rendering and transport. The UI layer
//! drives these types; the `api` crate plugs a REST collaborator in through
//! the [`NoteStore`] trait.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Note`, sensitivity score, the locked-content placeholder, `DecryptionPassword`, `UnlockedNote` |
//! | [`store`] | The `NoteStore` trait, request payloads and `StoreError` |
//! | [`visibility`] | Resolves a fetched note to locked / unlocked / not found / wrong password |
//! | [`password`] | Keeps the password that unlocked the current note and hands it to the edit flow |
//! | [`reconcile`] | Chooses and executes one of six save strategies |
//! | [`scope`] | Cancellation scope tied to a mounted view |
//! | [`session`] | Per-view state machine combining the three above |
//! | [`listing`] | Search and sort for the notes list |

pub mod listing;
pub mod models;
pub mod password;
pub mod reconcile;
pub mod scope;
pub mod session;
pub mod store;
pub mod visibility;

mod memory;
pub use memory::{MemoryNoteStore, StoreCall};

pub use listing::{NoteQuery, SortOrder};
pub use models::{
    is_locked_placeholder, DecryptionPassword, Note, NoteSensitivity, SensitivityLevel,
    UnlockedNote, LOCKED_CONTENT, LOCKED_PREFIX,
};
pub use password::{edit_path, handoff_password, EditHandoff, PasswordError, PasswordKeeper};
pub use reconcile::{
    execute, reconcile, save, EncryptionIntent, SaveError, SaveOutcome, SaveStrategy, StrategyKind,
};
pub use scope::{Cancelled, ViewScope};
pub use session::{Applied, Completed, NoteSession, PendingFetch, ViewState};
pub use store::{NoteDraft, NoteStore, NoteUpdate, Page, StoreError};
pub use visibility::{resolve, ResolveError, Visibility};
