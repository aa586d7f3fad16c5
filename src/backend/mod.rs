//! Backend Layer
//!
//! Remote note store abstraction and its implementations.

mod graphql;
mod memory;
mod poller;
mod subscription;
mod traits;

pub use graphql::{GraphQlAuth, GraphQlBackend, CREATE_NOTE, DELETE_NOTE, LIST_NOTES, UPDATE_NOTE};
pub use memory::InMemoryBackend;
pub use subscription::{EventHub, NoteEvent, Subscription};
pub use traits::NoteBackend;
