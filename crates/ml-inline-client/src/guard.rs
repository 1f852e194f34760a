//! In-flight save guard
//!
//! One key per field with a save outstanding. Insertion is the atomic
//! check-and-set: a second trigger for the same key while the first is in
//! flight finds the key present and is dropped.

use dashmap::DashSet;
use ml_inline_model::EditableField;
use std::sync::Arc;

/// Set of fields with a save in flight, shared by every control on a page
#[derive(Debug, Default)]
pub struct GuardSet {
    in_flight: DashSet<EditableField>,
}

impl GuardSet {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim `key`, or `None` when a save for it is already running.
    ///
    /// The key is released when the returned ticket drops, whichever way
    /// the attempt ends.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>, key: EditableField) -> Option<GuardTicket> {
        if self.in_flight.insert(key) {
            Some(GuardTicket {
                set: Arc::clone(self),
                key,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, key: &EditableField) -> bool {
        self.in_flight.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Membership of one key in a [`GuardSet`]
#[derive(Debug)]
pub struct GuardTicket {
    set: Arc<GuardSet>,
    key: EditableField,
}

impl GuardTicket {
    #[must_use]
    pub fn key(&self) -> EditableField {
        self.key
    }
}

impl Drop for GuardTicket {
    fn drop(&mut self) {
        self.set.in_flight.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_inline_model::{AttachmentId, FieldName};

    fn key(id: u64, field: FieldName) -> EditableField {
        EditableField::new(AttachmentId::new(id).unwrap(), field)
    }

    #[test]
    fn second_acquire_is_refused_until_release() {
        let guards = GuardSet::new();
        let ticket = guards.try_acquire(key(7, FieldName::Title)).unwrap();
        assert!(guards.try_acquire(key(7, FieldName::Title)).is_none());
        assert!(guards.contains(&key(7, FieldName::Title)));

        drop(ticket);
        assert!(guards.is_empty());
        assert!(guards.try_acquire(key(7, FieldName::Title)).is_some());
    }

    #[test]
    fn keys_are_independent() {
        let guards = GuardSet::new();
        let _a = guards.try_acquire(key(7, FieldName::Title)).unwrap();
        let _b = guards.try_acquire(key(7, FieldName::AltText)).unwrap();
        let _c = guards.try_acquire(key(8, FieldName::Title)).unwrap();
        assert_eq!(guards.len(), 3);
    }

    #[test]
    fn concurrent_claims_admit_exactly_one() {
        let guards = GuardSet::new();
        let k = key(1, FieldName::Description);
        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let guards = Arc::clone(&guards);
                    s.spawn(move || guards.try_acquire(k).map(std::mem::forget).is_some())
                })
                .collect();
            handles.into_iter().map(|h| usize::from(h.join().unwrap())).sum()
        });
        assert_eq!(winners, 1);
    }
}
