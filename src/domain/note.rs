//! Note Entity
//!
//! A user-owned text record with a backend-assigned identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use super::entity::Entity;

/// Opaque backend-assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A note as the backend reports it
///
/// Only created notes exist as `Note`; text being composed lives in
/// [`EditDraft`](super::EditDraft) until the backend assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Note content (the `note` field on the wire)
    #[serde(rename = "note")]
    pub text: String,
    /// Owning username, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            owner: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl Entity for Note {
    type Id = NoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = Note::new("1", "Buy milk").with_owner("alice");
        assert_eq!(note.id().as_str(), "1");
        assert_eq!(note.text, "Buy milk");
        assert_eq!(note.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn test_wire_format() {
        let note: Note = serde_json::from_str(
            r#"{"id":"abc","note":"hello","owner":"bob","createdAt":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(note.id, NoteId::new("abc"));
        assert_eq!(note.text, "hello");
        assert_eq!(note.owner.as_deref(), Some("bob"));
        assert!(note.created_at.is_some());
        assert!(note.updated_at.is_none());

        let json = serde_json::to_value(Note::new("x", "y")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "x", "note": "y"}));
    }
}
