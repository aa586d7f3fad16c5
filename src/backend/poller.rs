//! Snapshot Poller
//!
//! Turns periodic full listings into created/updated/deleted events, so a
//! subscription also sees changes made by other sessions.

use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::domain::{Note, NoteId};
use super::subscription::{EventSink, NoteEvent};
use super::traits::NoteBackend;

type Snapshot = HashMap<NoteId, Note>;

fn snapshot(notes: Vec<Note>) -> Snapshot {
    notes.into_iter().map(|n| (n.id.clone(), n)).collect()
}

/// Events that turn `previous` into `current`
///
/// Deletions come first, then updates, then creations oldest first so that
/// prepending them leaves the newest on top.
pub(crate) fn diff_snapshots(previous: &Snapshot, current: &[Note]) -> Vec<NoteEvent> {
    let mut events = Vec::new();

    let mut removed: Vec<&NoteId> = previous
        .keys()
        .filter(|id| !current.iter().any(|n| &n.id == *id))
        .collect();
    removed.sort();
    events.extend(removed.into_iter().cloned().map(NoteEvent::Deleted));

    let mut created = Vec::new();
    for note in current {
        match previous.get(&note.id) {
            Some(old) if old.text != note.text => events.push(NoteEvent::Updated(note.clone())),
            Some(_) => {}
            None => created.push(note.clone()),
        }
    }
    // listings are newest first; stable sort keeps that for missing timestamps
    created.reverse();
    created.sort_by_key(|n| n.created_at);
    events.extend(created.into_iter().map(NoteEvent::Created));

    events
}

/// Poll `backend` every `interval` until the subscription is cancelled
///
/// With no baseline, the first successful poll only establishes one.
pub(crate) fn spawn_snapshot_poller<B>(
    backend: B,
    baseline: Option<Vec<Note>>,
    interval: Duration,
    sink: EventSink,
) -> JoinHandle<()>
where
    B: NoteBackend + 'static,
{
    tokio::spawn(async move {
        let mut known = baseline.map(snapshot);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = sink.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let notes = match backend.list_all().await {
                Ok(notes) => notes,
                Err(e) => {
                    tracing::warn!(error = %e, "Snapshot poll failed");
                    continue;
                }
            };

            match &known {
                Some(previous) => {
                    for event in diff_snapshots(previous, &notes) {
                        if !sink.send(event) {
                            return;
                        }
                    }
                }
                None => tracing::info!(
                    count = notes.len(),
                    "Poller baseline established; earlier changes were not reported"
                ),
            }
            known = Some(snapshot(notes));
        }
        tracing::debug!("Snapshot poller stopped");
    })
}
