mod shell;
pub use shell::AppShell;

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod privacy_policy;
pub use privacy_policy::PrivacyPolicy;

mod notes;
pub use notes::Notes;

mod note_detail;
pub use note_detail::NoteDetail;

mod new_note;
pub use new_note::NewNote;

mod edit_note;
pub use edit_note::EditNote;

mod profile;
pub use profile::Profile;
