//! GraphQL Backend
//!
//! Talks to an AppSync-style GraphQL endpoint over HTTP. Mutations issued
//! here are echoed to local subscribers; a snapshot poller picks up
//! changes from other sessions.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::domain::{Note, NoteError, NoteId, NoteResult};
use super::poller::spawn_snapshot_poller;
use super::subscription::{EventHub, NoteEvent, Subscription};
use super::traits::NoteBackend;

// ========================
// Operations
// ========================

pub const LIST_NOTES: &str = r#"query ListNotes($filter: ModelNoteFilterInput, $limit: Int, $nextToken: String) {
  listNotes(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items {
      id
      note
      owner
    }
    nextToken
  }
}"#;

pub const CREATE_NOTE: &str = r#"mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    id
    note
    owner
  }
}"#;

pub const UPDATE_NOTE: &str = r#"mutation UpdateNote($input: UpdateNoteInput!) {
  updateNote(input: $input) {
    id
    note
    owner
  }
}"#;

pub const DELETE_NOTE: &str = r#"mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) {
    id
    note
    owner
  }
}"#;

/// Items requested per `listNotes` page
const PAGE_LIMIT: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ========================
// Wire Types
// ========================

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListNotesData {
    #[serde(rename = "listNotes")]
    list_notes: NoteConnection,
}

#[derive(Debug, Deserialize)]
struct NoteConnection {
    items: Vec<Note>,
    #[serde(rename = "nextToken")]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateNoteData {
    #[serde(rename = "createNote")]
    note: Option<Note>,
}

#[derive(Debug, Deserialize)]
struct UpdateNoteData {
    #[serde(rename = "updateNote")]
    note: Option<Note>,
}

#[derive(Debug, Deserialize)]
struct DeleteNoteData {
    #[serde(rename = "deleteNote")]
    note: Option<Note>,
}

impl GraphQlError {
    fn into_note_error(self) -> NoteError {
        let error_type = self.error_type.unwrap_or_default();
        if error_type.contains("ConditionalCheckFailed") || error_type.contains("NotFound") {
            NoteError::Conflict(self.message)
        } else if error_type.is_empty() {
            NoteError::Network(self.message)
        } else {
            NoteError::Network(format!("{}: {}", error_type, self.message))
        }
    }
}

impl<T> GraphQlResponse<T> {
    fn into_result(self) -> NoteResult<T> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error.into_note_error());
        }
        self.data
            .ok_or_else(|| NoteError::Network("response carried no data".to_string()))
    }
}

fn missing_payload(operation: &str) -> NoteError {
    NoteError::Network(format!("{} returned no note", operation))
}

// ========================
// Backend
// ========================

/// How requests authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphQlAuth {
    None,
    /// Sent as `x-api-key`
    ApiKey(String),
    /// Sent verbatim as `Authorization`
    Token(String),
}

#[derive(Clone)]
pub struct GraphQlBackend {
    client: reqwest::Client,
    endpoint: String,
    auth: GraphQlAuth,
    owner: Option<String>,
    poll_interval: Option<Duration>,
    hub: EventHub,
}

impl GraphQlBackend {
    pub fn new(endpoint: impl Into<String>, auth: GraphQlAuth) -> NoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NoteError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth,
            owner: None,
            poll_interval: None,
            hub: EventHub::new(),
        })
    }

    /// Only deliver events for this owner
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    /// Poll for remote changes while subscribed; `None` disables polling
    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> NoteResult<T> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables });
        request = match &self.auth {
            GraphQlAuth::None => request,
            GraphQlAuth::ApiKey(key) => request.header("x-api-key", key),
            GraphQlAuth::Token(token) => request.header(AUTHORIZATION, token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| NoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoteError::Network(format!("HTTP {}: {}", status, body)));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| NoteError::Network(format!("Invalid response: {}", e)))?;
        body.into_result()
    }

    fn publish(&self, note_owner: Option<&str>, event: NoteEvent) {
        let owner = note_owner.or(self.owner.as_deref());
        self.hub.publish(owner, event);
    }
}

#[async_trait]
impl NoteBackend for GraphQlBackend {
    async fn list_all(&self) -> NoteResult<Vec<Note>> {
        let mut notes = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let variables = json!({ "limit": PAGE_LIMIT, "nextToken": next_token });
            let page: ListNotesData = self.execute(LIST_NOTES, variables).await?;
            notes.extend(page.list_notes.items);

            match page.list_notes.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = notes.len(), "Listed notes");
        Ok(notes)
    }

    async fn create(&self, text: &str) -> NoteResult<Note> {
        let data: CreateNoteData = self
            .execute(CREATE_NOTE, json!({ "input": { "note": text } }))
            .await?;
        let note = data.note.ok_or_else(|| missing_payload("createNote"))?;

        self.publish(note.owner.as_deref(), NoteEvent::Created(note.clone()));
        Ok(note)
    }

    async fn update(&self, id: &NoteId, text: &str) -> NoteResult<Note> {
        let data: UpdateNoteData = self
            .execute(UPDATE_NOTE, json!({ "input": { "id": id, "note": text } }))
            .await?;
        let note = data.note.ok_or_else(|| missing_payload("updateNote"))?;

        self.publish(note.owner.as_deref(), NoteEvent::Updated(note.clone()));
        Ok(note)
    }

    async fn delete(&self, id: &NoteId) -> NoteResult<NoteId> {
        let data: DeleteNoteData = self
            .execute(DELETE_NOTE, json!({ "input": { "id": id } }))
            .await?;
        let note = data.note.ok_or_else(|| missing_payload("deleteNote"))?;

        self.publish(note.owner.as_deref(), NoteEvent::Deleted(note.id.clone()));
        Ok(note.id)
    }

    async fn subscribe(&self) -> NoteResult<Subscription> {
        let (subscription, sink) = self.hub.attach(self.owner.clone());

        if let Some(interval) = self.poll_interval {
            let baseline = match self.list_all().await {
                Ok(notes) => Some(notes),
                Err(e) => {
                    tracing::warn!(error = %e, "Baseline listing failed; poller will start cold");
                    None
                }
            };
            spawn_snapshot_poller(self.clone(), baseline, interval, sink);
        }

        Ok(subscription)
    }
}
