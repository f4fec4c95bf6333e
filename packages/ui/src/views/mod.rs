mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod notes_placeholder;
pub use notes_placeholder::NotesPlaceholder;

mod notes_list;
pub use notes_list::NotesListView;

mod note_edit;
pub use note_edit::NoteEditView;

mod profile;
pub use profile::ProfileView;
