//! Application State Store
//!
//! One immutable snapshot of everything the front end shows, advanced by
//! the pure [`reduce`] function. Local actions and backend events both go
//! through it.

use std::collections::HashSet;
use crate::domain::{EditDraft, Note, NoteId};
use crate::reconciler::{self, NoteList};

/// Snapshot of client state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Notes known to this session
    pub notes: NoteList,
    /// Form contents
    pub draft: EditDraft,
    /// A request is in flight
    pub is_loading: bool,
    /// The last request failed
    pub is_error: bool,
    /// Ids deleted since the last full listing; late create/update events
    /// for them are ignored
    pub deleted_ids: HashSet<NoteId>,
}

/// Every transition the state can make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Initial listing requested
    LoadStarted,
    /// Initial listing arrived
    Loaded(Vec<Note>),
    /// A mutation was sent
    RequestStarted,
    /// A request failed; the list is left untouched
    RequestFailed,
    Created(Note),
    Updated(Note),
    Deleted(NoteId),
    EditText(String),
    SelectForEdit(NoteId),
    ClearDraft,
    /// Draft was accepted by the backend
    Submitted,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether submitting now would update rather than create
    pub fn is_editing_existing(&self) -> bool {
        reconciler::has_existing_note(&self.notes, self.draft.target_id.as_ref())
    }

    /// Label for the submit button
    pub fn submit_label(&self) -> &'static str {
        if self.is_editing_existing() {
            "Update Note"
        } else {
            "Add Note"
        }
    }
}

/// Compute the next state for one action
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::LoadStarted => {
            next.is_loading = true;
            next.is_error = false;
        }
        Action::Loaded(notes) => {
            next.notes = reconciler::apply_full_listing(notes);
            next.deleted_ids.clear();
            next.is_loading = false;
            next.is_error = false;
        }
        Action::RequestStarted => {
            next.is_loading = true;
        }
        Action::RequestFailed => {
            next.is_loading = false;
            next.is_error = true;
        }
        Action::Created(note) => {
            if !state.deleted_ids.contains(&note.id) {
                next.notes = reconciler::apply_created(&state.notes, note);
            }
            next.is_loading = false;
        }
        Action::Updated(note) => {
            if !state.deleted_ids.contains(&note.id) {
                next.notes = reconciler::apply_updated(&state.notes, note);
            }
            next.is_loading = false;
        }
        Action::Deleted(id) => {
            next.notes = reconciler::apply_deleted(&state.notes, &id);
            next.deleted_ids.insert(id);
            next.is_loading = false;
        }
        Action::EditText(text) => {
            next.draft.text = text;
        }
        Action::SelectForEdit(id) => {
            if let Some(note) = state.notes.get(&id) {
                next.draft = EditDraft::editing(note);
            }
        }
        Action::ClearDraft | Action::Submitted => {
            next.draft = EditDraft::new();
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(notes: Vec<Note>) -> AppState {
        reduce(&AppState::new(), Action::Loaded(notes))
    }

    #[test]
    fn test_load_cycle_flags() {
        let state = reduce(&AppState::new(), Action::LoadStarted);
        assert!(state.is_loading);
        assert!(!state.is_error);

        let state = reduce(&state, Action::Loaded(vec![Note::new("1", "a")]));
        assert!(!state.is_loading);
        assert_eq!(state.notes.len(), 1);
    }

    #[test]
    fn test_request_failed_keeps_notes() {
        let state = loaded(vec![Note::new("1", "a")]);
        let pending = reduce(&state, Action::RequestStarted);
        let failed = reduce(&pending, Action::RequestFailed);

        assert!(failed.is_error);
        assert!(!failed.is_loading);
        assert_eq!(failed.notes, state.notes);
        assert_eq!(failed.draft, state.draft);
    }

    #[test]
    fn test_event_clears_loading() {
        let state = reduce(&loaded(vec![]), Action::RequestStarted);
        let state = reduce(&state, Action::Created(Note::new("1", "abc")));
        assert!(!state.is_loading);
        assert_eq!(state.notes.len(), 1);
    }

    #[test]
    fn test_select_for_edit_and_clear() {
        let state = loaded(vec![Note::new("1", "first"), Note::new("2", "second")]);
        assert_eq!(state.submit_label(), "Add Note");

        let editing = reduce(&state, Action::SelectForEdit(NoteId::new("2")));
        assert_eq!(editing.draft.text, "second");
        assert_eq!(editing.draft.target_id, Some(NoteId::new("2")));
        assert_eq!(editing.submit_label(), "Update Note");

        let typed = reduce(&editing, Action::EditText("second, revised".to_string()));
        assert_eq!(typed.draft.target_id, Some(NoteId::new("2")));

        let cleared = reduce(&typed, Action::ClearDraft);
        assert!(cleared.draft.is_empty());
        assert_eq!(cleared.notes, state.notes);
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let state = loaded(vec![Note::new("1", "first")]);
        let next = reduce(&state, Action::SelectForEdit(NoteId::new("nope")));
        assert_eq!(next, state);
    }

    #[test]
    fn test_target_deleted_elsewhere_falls_back_to_create() {
        let state = loaded(vec![Note::new("1", "first")]);
        let state = reduce(&state, Action::SelectForEdit(NoteId::new("1")));
        let state = reduce(&state, Action::Deleted(NoteId::new("1")));

        assert_eq!(state.draft.target_id, Some(NoteId::new("1")));
        assert!(!state.is_editing_existing());
        assert_eq!(state.submit_label(), "Add Note");
    }

    #[test]
    fn test_late_echo_does_not_restore_deleted_note() {
        let state = loaded(vec![Note::new("1", "a")]);
        let state = reduce(&state, Action::Created(Note::new("2", "b")));
        let state = reduce(&state, Action::Deleted(NoteId::new("2")));

        let state = reduce(&state, Action::Created(Note::new("2", "b")));
        let state = reduce(&state, Action::Updated(Note::new("2", "b2")));
        assert!(!state.notes.contains(&NoteId::new("2")));
        assert_eq!(state.notes.len(), 1);
    }

    #[test]
    fn test_full_listing_resets_deleted_ids() {
        let state = loaded(vec![Note::new("1", "a")]);
        let state = reduce(&state, Action::Deleted(NoteId::new("1")));
        assert!(state.deleted_ids.contains(&NoteId::new("1")));

        let state = reduce(&state, Action::Loaded(vec![Note::new("1", "restored")]));
        assert!(state.deleted_ids.is_empty());
        assert!(state.notes.contains(&NoteId::new("1")));
    }

    #[test]
    fn test_optimistic_and_echo_converge() {
        let base = loaded(vec![Note::new("1", "a")]);
        let created = Note::new("2", "b");

        // local result first, then subscription echo
        let local_first = reduce(&base, Action::Created(created.clone()));
        let local_first = reduce(&local_first, Action::Created(created.clone()));

        // echo first, then local result
        let echo_first = reduce(&base, Action::Created(created.clone()));
        let echo_first = reduce(&echo_first, Action::Created(created));

        assert_eq!(local_first.notes, echo_first.notes);
        assert_eq!(local_first.notes.len(), 2);
    }
}
