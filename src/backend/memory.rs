//! In-Memory Backend
//!
//! Process-local note store. Clones share the store and the event hub, so
//! a clone behaves like a second session of the same user.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::domain::{Note, NoteError, NoteId, NoteResult};
use super::subscription::{EventHub, NoteEvent, Subscription};
use super::traits::NoteBackend;

struct Shared {
    /// Oldest first
    notes: Mutex<Vec<Note>>,
    hub: EventHub,
    offline: AtomicBool,
    requests: AtomicUsize,
}

#[derive(Clone)]
pub struct InMemoryBackend {
    owner: String,
    shared: Arc<Shared>,
}

impl InMemoryBackend {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            shared: Arc::new(Shared {
                notes: Mutex::new(Vec::new()),
                hub: EventHub::new(),
                offline: AtomicBool::new(false),
                requests: AtomicUsize::new(0),
            }),
        }
    }

    /// Handle for another user on the same store
    pub fn as_owner(&self, owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Simulate losing (or regaining) connectivity
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Operations attempted so far, including failed ones
    pub fn request_count(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    fn begin_request(&self) -> NoteResult<()> {
        self.shared.requests.fetch_add(1, Ordering::SeqCst);
        if self.shared.offline.load(Ordering::SeqCst) {
            return Err(NoteError::Network("backend unreachable".to_string()));
        }
        Ok(())
    }

    fn owns(&self, note: &Note) -> bool {
        note.owner.as_deref() == Some(self.owner.as_str())
    }

    fn not_found(id: &NoteId) -> NoteError {
        NoteError::Conflict(format!("note {} does not exist", id))
    }
}

#[async_trait]
impl NoteBackend for InMemoryBackend {
    async fn list_all(&self) -> NoteResult<Vec<Note>> {
        self.begin_request()?;
        let notes = self.shared.notes.lock().await;
        Ok(notes.iter().rev().filter(|n| self.owns(n)).cloned().collect())
    }

    async fn create(&self, text: &str) -> NoteResult<Note> {
        self.begin_request()?;
        let mut note = Note::new(Uuid::new_v4().to_string(), text).with_owner(self.owner.clone());
        let now = Utc::now();
        note.created_at = Some(now);
        note.updated_at = Some(now);

        self.shared.notes.lock().await.push(note.clone());
        tracing::debug!(id = %note.id, owner = %self.owner, "Note created");

        self.shared.hub.publish(Some(&self.owner), NoteEvent::Created(note.clone()));
        Ok(note)
    }

    async fn update(&self, id: &NoteId, text: &str) -> NoteResult<Note> {
        self.begin_request()?;
        let updated = {
            let mut notes = self.shared.notes.lock().await;
            let note = notes
                .iter_mut()
                .find(|n| n.id == *id && self.owns(n))
                .ok_or_else(|| Self::not_found(id))?;
            note.text = text.to_string();
            note.updated_at = Some(Utc::now());
            note.clone()
        };

        self.shared.hub.publish(Some(&self.owner), NoteEvent::Updated(updated.clone()));
        Ok(updated)
    }

    async fn delete(&self, id: &NoteId) -> NoteResult<NoteId> {
        self.begin_request()?;
        {
            let mut notes = self.shared.notes.lock().await;
            let index = notes
                .iter()
                .position(|n| n.id == *id && self.owns(n))
                .ok_or_else(|| Self::not_found(id))?;
            notes.remove(index);
        }

        self.shared.hub.publish(Some(&self.owner), NoteEvent::Deleted(id.clone()));
        Ok(id.clone())
    }

    async fn subscribe(&self) -> NoteResult<Subscription> {
        self.begin_request()?;
        Ok(self.shared.hub.subscribe(Some(self.owner.clone())))
    }
}
