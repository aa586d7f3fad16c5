//! Subscriptions
//!
//! A [`Subscription`] is a cancelable handle over an unbounded event
//! channel. The [`EventHub`] fans backend events out to every live
//! subscription for the matching owner.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::domain::{Note, NoteId};

/// A change pushed by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    Created(Note),
    Updated(Note),
    Deleted(NoteId),
}

/// Receiving end of a subscription
///
/// Dropping the handle cancels it.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<NoteEvent>,
    token: CancellationToken,
}

impl Subscription {
    fn new(events: mpsc::UnboundedReceiver<NoteEvent>, token: CancellationToken) -> Self {
        Self { events, token }
    }

    /// Wait for the next event; `None` once cancelled or closed
    pub async fn next(&mut self) -> Option<NoteEvent> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Stop delivery. Safe to call more than once.
    pub fn cancel(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.events.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Sending end handed to producers that feed one subscription directly
#[derive(Clone)]
pub(crate) struct EventSink {
    sender: mpsc::UnboundedSender<NoteEvent>,
    token: CancellationToken,
}

impl EventSink {
    /// Returns false once the subscription is gone
    pub(crate) fn send(&self, event: NoteEvent) -> bool {
        !self.token.is_cancelled() && self.sender.send(event).is_ok()
    }

    pub(crate) async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

struct Subscriber {
    owner: Option<String>,
    sink: EventSink,
}

impl Subscriber {
    fn is_live(&self) -> bool {
        !self.sink.token.is_cancelled() && !self.sink.sender.is_closed()
    }

    fn wants(&self, owner: Option<&str>) -> bool {
        match &self.owner {
            None => true,
            Some(filter) => owner == Some(filter.as_str()),
        }
    }
}

/// Fan-out point for backend events
///
/// Cloning shares the subscriber set.
#[derive(Clone, Default)]
pub struct EventHub {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber; `owner = None` receives every event
    pub fn subscribe(&self, owner: Option<String>) -> Subscription {
        self.attach(owner).0
    }

    pub(crate) fn attach(&self, owner: Option<String>) -> (Subscription, EventSink) {
        let (sender, events) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let sink = EventSink { sender, token: token.clone() };

        self.lock().push(Subscriber { owner, sink: sink.clone() });
        (Subscription::new(events, token), sink)
    }

    /// Deliver `event` to live subscribers whose owner filter matches
    pub fn publish(&self, owner: Option<&str>, event: NoteEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(Subscriber::is_live);
        for subscriber in subscribers.iter().filter(|s| s.wants(owner)) {
            subscriber.sink.send(event.clone());
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(Subscriber::is_live);
        subscribers.len()
    }
}
