//! Domain Layer
//!
//! Note entity, edit draft and the shared error type.

mod draft;
mod entity;
mod note;

pub use draft::{validate_note_text, EditDraft, MIN_TEXT_LEN};
pub use entity::{Entity, NoteError, NoteResult};
pub use note::{Note, NoteId};
