//! Note List Reconciler
//!
//! Pure transitions from (current list, event) to the next list. Every
//! insert path removes an existing entry with the same id first, so the
//! list stays unique regardless of the order events arrive in.

use std::collections::HashSet;
use crate::domain::{Entity, Note};

/// Ordered entries, unique by id, most recently created first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityList<T> {
    entries: Vec<T>,
}

/// The client-side note cache
pub type NoteList = EntityList<Note>;

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Entity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn position(&self, id: &T::Id) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }
}

impl<'a, T> IntoIterator for &'a EntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Replace the whole list with a fresh listing, keeping source order
///
/// A listing that repeats an id keeps its first occurrence.
pub fn apply_full_listing<T: Entity>(entries: impl IntoIterator<Item = T>) -> EntityList<T> {
    let mut seen = HashSet::new();
    let entries = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id().clone()))
        .collect();
    EntityList { entries }
}

/// Put `entity` first, dropping any older entry with the same id
pub fn apply_created<T: Entity>(list: &EntityList<T>, entity: T) -> EntityList<T> {
    let mut entries = Vec::with_capacity(list.len() + 1);
    let id = entity.id().clone();
    entries.push(entity);
    entries.extend(list.iter().filter(|entry| *entry.id() != id).cloned());
    EntityList { entries }
}

/// Replace the entry with the same id in place; unknown ids are ignored
pub fn apply_updated<T: Entity>(list: &EntityList<T>, entity: T) -> EntityList<T> {
    let mut next = list.clone();
    if let Some(slot) = next.entries.iter_mut().find(|entry| entry.id() == entity.id()) {
        *slot = entity;
    }
    next
}

/// Remove the entry with `id`, if any
pub fn apply_deleted<T: Entity>(list: &EntityList<T>, id: &T::Id) -> EntityList<T> {
    let entries = list
        .iter()
        .filter(|entry| entry.id() != id)
        .cloned()
        .collect();
    EntityList { entries }
}

/// Whether a draft target refers to an entry currently in the list
pub fn has_existing_note<T: Entity>(list: &EntityList<T>, id: Option<&T::Id>) -> bool {
    id.is_some_and(|id| list.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoteId;

    fn note(id: &str, text: &str) -> Note {
        Note::new(id, text)
    }

    fn ids(list: &NoteList) -> Vec<&str> {
        list.iter().map(|n| n.id.as_str()).collect()
    }

    fn assert_unique(list: &NoteList) {
        let mut seen = HashSet::new();
        for entry in list {
            assert!(seen.insert(entry.id.clone()), "duplicate id {}", entry.id);
        }
    }

    #[test]
    fn test_listing_create_update_delete_scenario() {
        let list = NoteList::new();
        assert!(list.is_empty());

        let list = apply_full_listing(vec![note("1", "a")]);
        assert_eq!(list.as_slice(), &[note("1", "a")]);

        let list = apply_created(&list, note("2", "b"));
        assert_eq!(list.as_slice(), &[note("2", "b"), note("1", "a")]);

        let list = apply_updated(&list, note("1", "a2"));
        assert_eq!(list.as_slice(), &[note("2", "b"), note("1", "a2")]);

        let list = apply_deleted(&list, &NoteId::new("2"));
        assert_eq!(list.as_slice(), &[note("1", "a2")]);
    }

    #[test]
    fn test_created_dedups_and_moves_to_front() {
        let list = apply_full_listing(vec![note("1", "a"), note("2", "b"), note("3", "c")]);
        let next = apply_created(&list, note("2", "b (echo)"));

        assert_eq!(ids(&next), vec!["2", "1", "3"]);
        assert_eq!(next.as_slice()[0].text, "b (echo)");
        assert_unique(&next);
    }

    #[test]
    fn test_created_twice_is_idempotent() {
        let list = apply_full_listing(vec![note("1", "a")]);
        let once = apply_created(&list, note("2", "b"));
        let twice = apply_created(&once, note("2", "b"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_updated_keeps_position_and_length() {
        let list = apply_full_listing(vec![note("1", "a"), note("2", "b"), note("3", "c")]);
        let next = apply_updated(&list, note("2", "b2"));

        assert_eq!(next.len(), list.len());
        assert_eq!(next.position(&NoteId::new("2")), Some(1));
        assert_eq!(next.get(&NoteId::new("2")).unwrap().text, "b2");

        let again = apply_updated(&next, note("2", "b2"));
        assert_eq!(next, again);
    }

    #[test]
    fn test_updated_unknown_id_is_dropped() {
        let list = apply_full_listing(vec![note("1", "a")]);
        let next = apply_updated(&list, note("404", "ghost"));
        assert_eq!(next, list);
    }

    #[test]
    fn test_deleted_is_idempotent() {
        let list = apply_full_listing(vec![note("1", "a"), note("2", "b")]);
        let id = NoteId::new("1");
        let once = apply_deleted(&list, &id);
        let twice = apply_deleted(&once, &id);

        assert_eq!(ids(&once), vec!["2"]);
        assert_eq!(once, twice);
        assert_eq!(apply_deleted(&list, &NoteId::new("missing")), list);
    }

    #[test]
    fn test_has_existing_note() {
        let list = apply_full_listing(vec![note("1", "a")]);
        assert!(has_existing_note(&list, Some(&NoteId::new("1"))));
        assert!(!has_existing_note(&list, Some(&NoteId::new("2"))));
        assert!(!has_existing_note(&list, None));
    }

    #[test]
    fn test_full_listing_replaces_and_dedups() {
        let old = apply_full_listing(vec![note("9", "old")]);
        assert_eq!(ids(&old), vec!["9"]);

        let list = apply_full_listing(vec![note("2", "b"), note("1", "a"), note("2", "dup")]);
        assert_eq!(ids(&list), vec!["2", "1"]);
        assert_eq!(list.as_slice()[0].text, "b");
    }
}
