//! Edit Draft
//!
//! Text being composed, optionally targeting an existing note.

use super::entity::{NoteError, NoteResult};
use super::note::{Note, NoteId};

/// Trimmed text must be longer than this to be submitted
pub const MIN_TEXT_LEN: usize = 2;

/// Transient form state
///
/// `target_id == None` means composing a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub text: String,
    pub target_id: Option<NoteId>,
}

impl EditDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-filled from an existing note
    pub fn editing(note: &Note) -> Self {
        Self {
            text: note.text.clone(),
            target_id: Some(note.id.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.target_id.is_none()
    }

    /// Trimmed text, or a validation error if it is too short
    pub fn validated_text(&self) -> NoteResult<&str> {
        validate_note_text(&self.text)
    }
}

/// Reject text whose trimmed length is `MIN_TEXT_LEN` characters or fewer
pub fn validate_note_text(text: &str) -> NoteResult<&str> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len <= MIN_TEXT_LEN {
        return Err(NoteError::Validation(format!(
            "note must be longer than {} characters (got {})",
            MIN_TEXT_LEN, len
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_boundary() {
        assert!(validate_note_text("ok").is_err());
        assert_eq!(validate_note_text("oka").unwrap(), "oka");
    }

    #[test]
    fn test_trims_before_checking() {
        assert!(validate_note_text("   ok   ").is_err());
        assert!(validate_note_text("").is_err());
        assert_eq!(validate_note_text("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // two characters, six bytes
        assert!(validate_note_text("日本").is_err());
        assert!(validate_note_text("日本語").is_ok());
    }

    #[test]
    fn test_editing_draft() {
        let note = Note::new("9", "existing");
        let draft = EditDraft::editing(&note);
        assert_eq!(draft.text, "existing");
        assert_eq!(draft.target_id, Some(NoteId::new("9")));
        assert!(!draft.is_empty());
        assert!(EditDraft::new().is_empty());
    }
}
