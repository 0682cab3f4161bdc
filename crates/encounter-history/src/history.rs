//! The [`History`] facade: recording state machine plus guarded buffer.
//!
//! Producer operations ([`log_start`], [`resolve_identity`], [`log_end`],
//! [`reset`]) take the recording lock. Only [`log_end`] also takes the
//! entries lock, after the recording lock and only for the push itself.
//! Consumers take the entries lock through [`lock`] or [`lock_deferred`] and
//! read through the returned guard.
//!
//! A history is meant to be built once by the composition root and shared
//! as a [`SharedHistory`] with both the event-ingestion path and any
//! reporting path.
//!
//! [`log_start`]: History::log_start
//! [`resolve_identity`]: History::resolve_identity
//! [`log_end`]: History::log_end
//! [`reset`]: History::reset
//! [`lock`]: History::lock
//! [`lock_deferred`]: History::lock_deferred

use std::collections::vec_deque::{Iter, IterMut};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use encounter_types::{EncounterRecord, EncounterSignal, IdentityInfo, TrackerId};
use tracing::{debug, info};

use crate::buffer::HistoryBuffer;
use crate::clock::{SystemWallClock, WallClock};
use crate::config::{ConfigError, HistoryConfig};
use crate::guard::{DeferredEntriesLock, EntriesGuard};
use crate::payload::{NoPayload, PayloadSource};
use crate::recording::{RecordingError, RecordingState, RecordingStatus};

/// A history shared between the producer and consumer paths.
pub type SharedHistory<S = NoPayload> = Arc<History<S>>;

/// Bounded, thread-safe history of completed encounters.
pub struct History<S: PayloadSource = NoPayload> {
    /// Recording state machine and tracker id counter. Taken before
    /// `entries` whenever both are held.
    recording: Mutex<RecordingState>,
    /// Committed records.
    entries: Mutex<HistoryBuffer<S::Payload>>,
    /// Retention limit, readable without locking.
    capacity: NonZeroUsize,
    /// Builds the payload attached to each record.
    source: S,
    /// Supplies the time of day captured at start.
    clock: Box<dyn WallClock>,
}

impl History<NoPayload> {
    /// Create a payload-less history from configuration, using the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured capacity is zero.
    pub fn new(config: &HistoryConfig) -> Result<Self, ConfigError> {
        Self::with_source(config, NoPayload)
    }
}

impl<S: PayloadSource> History<S> {
    /// Create a history from configuration with a payload source, using the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured capacity is zero.
    pub fn with_source(config: &HistoryConfig, source: S) -> Result<Self, ConfigError> {
        let capacity = config.validated_capacity()?;
        Ok(Self::from_parts(capacity, source, SystemWallClock))
    }

    /// Create a history from explicit parts.
    pub fn from_parts(
        capacity: NonZeroUsize,
        source: S,
        clock: impl WallClock + 'static,
    ) -> Self {
        Self {
            recording: Mutex::new(RecordingState::new()),
            entries: Mutex::new(HistoryBuffer::new(capacity)),
            capacity,
            source,
            clock: Box::new(clock),
        }
    }

    /// Replace the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Wrap this history for sharing across threads.
    pub fn into_shared(self) -> SharedHistory<S> {
        Arc::new(self)
    }

    /// Maximum number of retained records.
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// The payload source records are enriched by.
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn lock_recording(&self) -> MutexGuard<'_, RecordingState> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Producer operations
    // -----------------------------------------------------------------------

    /// Begin recording an encounter for `signal.subject`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::OutOfSequence`] if an encounter is already
    /// in progress or awaiting reset. The current recording is kept.
    pub fn log_start(&self, signal: &EncounterSignal) -> Result<(), RecordingError> {
        let mut recording = self.lock_recording();
        let started_at = self.clock.time_of_day();
        match recording.start(signal, started_at) {
            Ok(()) => {
                debug!(subject = %signal.subject, begin = %signal.time, %started_at, "Encounter started");
                Ok(())
            }
            Err(err) => {
                debug!(subject = %signal.subject, %err, "Start signal ignored");
                Err(err)
            }
        }
    }

    /// Offer an identity resolution to the recording.
    ///
    /// Returns `Ok(true)` if `info` named the subject being recorded and
    /// `Ok(false)` if it described some other identity.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::OutOfSequence`] unless the recording is
    /// waiting for a name.
    pub fn resolve_identity(&self, info: &IdentityInfo) -> Result<bool, RecordingError> {
        let mut recording = self.lock_recording();
        let matched = recording.identify(info)?;
        if matched {
            debug!(subject = %info.id, name = %info.name, "Encounter subject named");
        }
        Ok(matched)
    }

    /// Close the encounter and commit it to the history.
    ///
    /// Also accepted before any name was resolved; the record then carries
    /// an empty name. Returns the tracker id the record was committed under.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::OutOfSequence`] if no encounter is open,
    /// or [`RecordingError::TrackerIdsExhausted`] if no id is left. Nothing
    /// is committed in either case.
    pub fn log_end(&self, signal: &EncounterSignal) -> Result<TrackerId, RecordingError> {
        let mut recording = self.lock_recording();
        let (tracker_id, summary) = match recording.finish(signal) {
            Ok(finished) => finished,
            Err(err) => {
                debug!(subject = %signal.subject, %err, "End signal ignored");
                return Err(err);
            }
        };

        let payload = self.source.collect(&summary);
        let name = summary.display_name();
        let duration_ms = summary.duration_ms();
        let record = EncounterRecord {
            tracker_id,
            summary,
            payload,
        };

        let evicted = EntriesGuard::acquire(&self.entries).push(record);
        drop(recording);

        info!(%tracker_id, %name, duration_ms, "Encounter committed");
        if let Some(evicted) = evicted {
            debug!(tracker_id = %evicted.tracker_id, "Evicted oldest encounter");
        }
        Ok(tracker_id)
    }

    /// Drop any in-progress recording and return to the empty state.
    ///
    /// Accepted in every state; committed records are not touched. Returns
    /// the state that was left.
    pub fn reset(&self, signal: &EncounterSignal) -> RecordingStatus {
        let previous = self.lock_recording().reset();
        debug!(subject = %signal.subject, %previous, "Recording reset");
        previous
    }

    // -----------------------------------------------------------------------
    // Consumer operations
    // -----------------------------------------------------------------------

    /// Take the entries lock, blocking until it is free.
    pub fn lock(&self) -> EntriesGuard<'_, S::Payload> {
        EntriesGuard::acquire(&self.entries)
    }

    /// Name the entries lock without taking it.
    pub const fn lock_deferred(&self) -> DeferredEntriesLock<'_, S::Payload> {
        DeferredEntriesLock::new(&self.entries)
    }

    #[track_caller]
    fn assert_owns(&self, guard: &EntriesGuard<'_, S::Payload>) {
        assert!(
            guard.is_for(&self.entries),
            "entries guard was issued by a different history"
        );
    }

    /// Position of the record committed under `tracker_id`.
    ///
    /// The index is valid only while `guard` is held.
    ///
    /// # Panics
    ///
    /// Panics if `guard` was issued by a different history.
    #[track_caller]
    pub fn find_index_by_id(
        &self,
        tracker_id: TrackerId,
        guard: &EntriesGuard<'_, S::Payload>,
    ) -> Option<usize> {
        self.assert_owns(guard);
        guard.find_index_by_id(tracker_id)
    }

    /// Iterate committed records oldest to newest.
    ///
    /// # Panics
    ///
    /// Panics if `guard` was issued by a different history.
    #[track_caller]
    pub fn iter<'g>(
        &self,
        guard: &'g EntriesGuard<'_, S::Payload>,
    ) -> Iter<'g, EncounterRecord<S::Payload>> {
        self.assert_owns(guard);
        guard.iter()
    }

    /// Iterate committed records oldest to newest, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `guard` was issued by a different history.
    #[track_caller]
    pub fn iter_mut<'g>(
        &self,
        guard: &'g mut EntriesGuard<'_, S::Payload>,
    ) -> IterMut<'g, EncounterRecord<S::Payload>> {
        self.assert_owns(guard);
        guard.iter_mut()
    }

    /// The record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `guard` was issued by a different history or `index` is
    /// out of range.
    #[track_caller]
    pub fn at<'g>(
        &self,
        index: usize,
        guard: &'g EntriesGuard<'_, S::Payload>,
    ) -> &'g EncounterRecord<S::Payload> {
        self.assert_owns(guard);
        guard.at(index)
    }

    /// The record at `index`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `guard` was issued by a different history or `index` is
    /// out of range.
    #[track_caller]
    pub fn at_mut<'g>(
        &self,
        index: usize,
        guard: &'g mut EntriesGuard<'_, S::Payload>,
    ) -> &'g mut EncounterRecord<S::Payload> {
        self.assert_owns(guard);
        guard.at_mut(index)
    }
}

impl<S: PayloadSource> core::fmt::Debug for History<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("History")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
