//! Note Session
//!
//! Drives one user session: initial listing, subscription, and the form
//! actions. Every result, local or pushed, is applied through
//! [`store::reduce`], one at a time.

use crate::backend::{NoteBackend, NoteEvent, Subscription};
use crate::domain::{Note, NoteId, NoteResult};
use crate::reconciler::NoteList;
use crate::store::{self, Action, AppState};

impl From<NoteEvent> for Action {
    fn from(event: NoteEvent) -> Self {
        match event {
            NoteEvent::Created(note) => Action::Created(note),
            NoteEvent::Updated(note) => Action::Updated(note),
            NoteEvent::Deleted(id) => Action::Deleted(id),
        }
    }
}

pub struct NoteSession<B: NoteBackend> {
    backend: B,
    state: AppState,
    subscription: Option<Subscription>,
}

impl<B: NoteBackend> NoteSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: AppState::new(),
            subscription: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn notes(&self) -> &NoteList {
        &self.state.notes
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    fn dispatch(&mut self, action: Action) {
        self.state = store::reduce(&self.state, action);
    }

    /// Load the full listing, then open the subscription
    pub async fn start(&mut self) -> NoteResult<()> {
        self.refresh().await?;

        if self.subscription.is_none() {
            match self.backend.subscribe().await {
                Ok(subscription) => self.subscription = Some(subscription),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to subscribe to note events");
                    self.dispatch(Action::RequestFailed);
                    return Err(e);
                }
            }
        }
        tracing::info!(count = self.state.notes.len(), "Session started");
        Ok(())
    }

    /// Replace the list with a fresh listing
    pub async fn refresh(&mut self) -> NoteResult<()> {
        self.dispatch(Action::LoadStarted);
        match self.backend.list_all().await {
            Ok(notes) => {
                self.dispatch(Action::Loaded(notes));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list notes");
                self.dispatch(Action::RequestFailed);
                Err(e)
            }
        }
    }

    pub fn edit_text(&mut self, text: impl Into<String>) {
        self.dispatch(Action::EditText(text.into()));
    }

    pub fn select_for_edit(&mut self, id: &NoteId) {
        self.dispatch(Action::SelectForEdit(id.clone()));
    }

    pub fn clear_draft(&mut self) {
        self.dispatch(Action::ClearDraft);
    }

    /// Send the draft as a create or update
    ///
    /// Too-short text is rejected before anything else happens. A draft
    /// whose target is no longer listed is created as a new note.
    pub async fn submit(&mut self) -> NoteResult<Note> {
        let text = self.state.draft.validated_text()?.to_string();
        let target = self
            .state
            .draft
            .target_id
            .clone()
            .filter(|id| self.state.notes.contains(id));

        self.dispatch(Action::RequestStarted);
        let result = match &target {
            Some(id) => self.backend.update(id, &text).await,
            None => self.backend.create(&text).await,
        };

        match result {
            Ok(note) => {
                let action = if target.is_some() {
                    Action::Updated(note.clone())
                } else {
                    Action::Created(note.clone())
                };
                self.dispatch(action);
                self.dispatch(Action::Submitted);
                Ok(note)
            }
            Err(e) => {
                tracing::warn!(error = %e, note_id = ?target, "Submit failed");
                self.dispatch(Action::RequestFailed);
                Err(e)
            }
        }
    }

    pub async fn delete(&mut self, id: &NoteId) -> NoteResult<()> {
        self.dispatch(Action::RequestStarted);
        match self.backend.delete(id).await {
            Ok(deleted) => {
                self.dispatch(Action::Deleted(deleted));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "Delete failed");
                self.dispatch(Action::RequestFailed);
                Err(e)
            }
        }
    }

    /// Apply a pushed event as if it came from the subscription
    pub fn apply_event(&mut self, event: NoteEvent) {
        self.dispatch(event.into());
    }

    /// Wait for one subscription event and apply it
    ///
    /// Returns `None` when there is no open subscription.
    pub async fn next_event(&mut self) -> Option<NoteEvent> {
        let subscription = self.subscription.as_mut()?;
        match subscription.next().await {
            Some(event) => {
                tracing::debug!(event = ?event, "Applying pushed event");
                self.apply_event(event.clone());
                Some(event)
            }
            None => {
                self.subscription = None;
                None
            }
        }
    }

    /// Cancel the subscription; later calls do nothing
    pub fn shutdown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::info!("Session subscription cancelled");
        }
    }
}
