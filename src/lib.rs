//! Amplify Notes Client
//!
//! Layered architecture:
//! - domain: Note entity, edit draft, error type
//! - reconciler: pure list transitions keyed by note id
//! - store: state snapshot and reducer
//! - backend: remote note store abstraction (GraphQL, in-memory)
//! - session: ties the backend's results and events to the store

pub mod backend;
pub mod config;
pub mod domain;
pub mod reconciler;
pub mod session;
pub mod store;

pub use backend::{GraphQlBackend, InMemoryBackend, NoteBackend, NoteEvent, Subscription};
pub use config::{ClientConfig, ConfigError};
pub use domain::{EditDraft, Note, NoteError, NoteId, NoteResult};
pub use reconciler::NoteList;
pub use session::NoteSession;
pub use store::{reduce, Action, AppState};
