//! The capped, insertion-ordered record buffer.
//!
//! Records are appended at the tail in commit order. Once the buffer holds
//! `capacity` records, each push evicts the record at the head, so index 0
//! is always the oldest retained record. The buffer is never reordered.
//!
//! Consumers reach a [`HistoryBuffer`] only through an
//! [`EntriesGuard`](crate::EntriesGuard), which dereferences to it while the
//! entries lock is held. Indices are only meaningful for as long as that
//! guard lives: a later push can shift every index by one.

use std::collections::VecDeque;
use std::collections::vec_deque::{Iter, IterMut};
use std::num::NonZeroUsize;

use encounter_types::{EncounterRecord, TrackerId};

/// Bounded sequence of the most recently committed records.
#[derive(Debug)]
pub struct HistoryBuffer<P = ()> {
    /// Records in commit order; the front is the oldest.
    entries: VecDeque<EncounterRecord<P>>,
    /// Maximum number of retained records.
    capacity: NonZeroUsize,
}

impl<P> HistoryBuffer<P> {
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append `record`, evicting and returning the oldest record if the
    /// buffer was full.
    pub(crate) fn push(&mut self, record: EncounterRecord<P>) -> Option<EncounterRecord<P>> {
        debug_assert!(
            self.entries
                .back()
                .is_none_or(|last| last.tracker_id < record.tracker_id),
            "tracker ids must be pushed in increasing order"
        );
        let evicted = if self.entries.len() >= self.capacity.get() {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(record);
        evicted
    }

    /// Maximum number of retained records.
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no record has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the record committed under `tracker_id`.
    ///
    /// Returns `None` for ids that were never committed or have been
    /// evicted. The index is only valid while the current guard is held.
    pub fn find_index_by_id(&self, tracker_id: TrackerId) -> Option<usize> {
        self.entries
            .iter()
            .position(|record| record.tracker_id == tracker_id)
    }

    /// The record committed under `tracker_id`, if still retained.
    pub fn find_by_id(&self, tracker_id: TrackerId) -> Option<&EncounterRecord<P>> {
        self.entries
            .iter()
            .find(|record| record.tracker_id == tracker_id)
    }

    /// The record at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&EncounterRecord<P>> {
        self.entries.get(index)
    }

    /// The record at `index`, mutably, if in range.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut EncounterRecord<P>> {
        self.entries.get_mut(index)
    }

    /// The record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. An out-of-range index means the
    /// caller used an index past the lifetime of the guard it came from.
    #[allow(clippy::panic)]
    pub fn at(&self, index: usize) -> &EncounterRecord<P> {
        let len = self.entries.len();
        match self.entries.get(index) {
            Some(record) => record,
            None => panic!("history index {index} out of range (len {len})"),
        }
    }

    /// The record at `index`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[allow(clippy::panic)]
    pub fn at_mut(&mut self, index: usize) -> &mut EncounterRecord<P> {
        let len = self.entries.len();
        match self.entries.get_mut(index) {
            Some(record) => record,
            None => panic!("history index {index} out of range (len {len})"),
        }
    }

    /// The most recently committed record.
    pub fn latest(&self) -> Option<&EncounterRecord<P>> {
        self.entries.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> Iter<'_, EncounterRecord<P>> {
        self.entries.iter()
    }

    /// Iterate oldest to newest, mutably.
    ///
    /// Callers may edit payloads and summaries; rewriting `tracker_id`
    /// breaks lookups by id.
    pub fn iter_mut(&mut self) -> IterMut<'_, EncounterRecord<P>> {
        self.entries.iter_mut()
    }
}

impl<'a, P> IntoIterator for &'a HistoryBuffer<P> {
    type Item = &'a EncounterRecord<P>;
    type IntoIter = Iter<'a, EncounterRecord<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, P> IntoIterator for &'a mut HistoryBuffer<P> {
    type Item = &'a mut EncounterRecord<P>;
    type IntoIter = IterMut<'a, EncounterRecord<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
