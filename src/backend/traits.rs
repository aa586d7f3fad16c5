//! Backend Layer - Core Trait
//!
//! The four note operations plus the subscription channel. Implementations
//! can talk to a hosted GraphQL API, keep notes in memory, etc.

use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::{Note, NoteId, NoteResult};
use super::subscription::Subscription;

/// Remote note store scoped to the current user
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// Full snapshot of the user's notes
    async fn list_all(&self) -> NoteResult<Vec<Note>>;

    /// Create a note; the backend assigns the id
    async fn create(&self, text: &str) -> NoteResult<Note>;

    /// Replace the text of an existing note
    async fn update(&self, id: &NoteId, text: &str) -> NoteResult<Note>;

    /// Delete a note, returning its id
    async fn delete(&self, id: &NoteId) -> NoteResult<NoteId>;

    /// Open a stream of created/updated/deleted events
    async fn subscribe(&self) -> NoteResult<Subscription>;
}

#[async_trait]
impl<B: NoteBackend + ?Sized> NoteBackend for Arc<B> {
    async fn list_all(&self) -> NoteResult<Vec<Note>> {
        (**self).list_all().await
    }

    async fn create(&self, text: &str) -> NoteResult<Note> {
        (**self).create(text).await
    }

    async fn update(&self, id: &NoteId, text: &str) -> NoteResult<Note> {
        (**self).update(id, text).await
    }

    async fn delete(&self, id: &NoteId) -> NoteResult<NoteId> {
        (**self).delete(id).await
    }

    async fn subscribe(&self) -> NoteResult<Subscription> {
        (**self).subscribe().await
    }
}
