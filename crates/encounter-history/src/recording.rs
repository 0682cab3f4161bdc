//! The recording state machine.
//!
//! Tracks the in-progress encounter across a sequence of producer calls:
//!
//! ```text
//! Empty --start--> WaitingForName --identify--> NameAcquired
//!                       |                            |
//!                       +------------end-------------+--> WaitingForReset
//!
//! any state --reset--> Empty
//! ```
//!
//! Only [`RecordingState::finish`] produces anything observable outside the
//! state machine: a frozen [`EncounterSummary`] and the [`TrackerId`] it is
//! committed under. Every other transition touches provisional fields only.
//!
//! Calls that do not fit the current state are rejected with
//! [`RecordingError::OutOfSequence`] and leave the state untouched. In
//! particular a second start while an encounter is in progress keeps the
//! existing recording.

use chrono::NaiveTime;
use encounter_types::{
    AgentId, EncounterSignal, EncounterSummary, EventTime, IdentityInfo, TrackerId,
};

/// Where the state machine currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecordingStatus {
    /// No encounter in progress.
    #[default]
    Empty,
    /// An encounter started; its subject has not been named yet.
    WaitingForName,
    /// The encounter ended and was committed; waiting for a reset.
    WaitingForReset,
    /// The subject was named; the encounter is still open.
    NameAcquired,
}

impl core::fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::WaitingForName => "waiting for name",
            Self::WaitingForReset => "waiting for reset",
            Self::NameAcquired => "name acquired",
        };
        f.write_str(label)
    }
}

/// Producer calls the state machine refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    /// The call is not valid in the current state. Nothing was changed.
    #[error("{operation} ignored while {status}")]
    OutOfSequence {
        /// The producer operation that was refused.
        operation: &'static str,
        /// The state the machine was in.
        status: RecordingStatus,
    },

    /// Every tracker id has been handed out.
    #[error("tracker id counter exhausted")]
    TrackerIdsExhausted,
}

/// Provisional fields of the encounter being recorded.
#[derive(Debug, Default)]
pub(crate) struct RecordingState {
    status: RecordingStatus,
    current_id: AgentId,
    current_name: String,
    begin: EventTime,
    started_at: NaiveTime,
    next_tracker_id: TrackerId,
}

impl RecordingState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn status(&self) -> RecordingStatus {
        self.status
    }

    const fn out_of_sequence(&self, operation: &'static str) -> RecordingError {
        RecordingError::OutOfSequence {
            operation,
            status: self.status,
        }
    }

    /// Begin recording an encounter. Valid only from `Empty`.
    pub(crate) fn start(
        &mut self,
        signal: &EncounterSignal,
        started_at: NaiveTime,
    ) -> Result<(), RecordingError> {
        if self.status != RecordingStatus::Empty {
            return Err(self.out_of_sequence("start"));
        }
        self.current_id = signal.subject;
        self.current_name.clear();
        self.begin = signal.time;
        self.started_at = started_at;
        self.status = RecordingStatus::WaitingForName;
        Ok(())
    }

    /// Attach a display name if `info` describes the subject being waited on.
    ///
    /// Returns `Ok(false)` for other identities.
    pub(crate) fn identify(&mut self, info: &IdentityInfo) -> Result<bool, RecordingError> {
        if self.status != RecordingStatus::WaitingForName {
            return Err(self.out_of_sequence("identify"));
        }
        if info.id != self.current_id {
            return Ok(false);
        }
        self.current_name.clone_from(&info.name);
        self.status = RecordingStatus::NameAcquired;
        Ok(true)
    }

    /// Close the encounter and allocate its tracker id.
    ///
    /// Accepted from `NameAcquired` and from `WaitingForName`, in which case
    /// the summary carries an empty name.
    pub(crate) fn finish(
        &mut self,
        signal: &EncounterSignal,
    ) -> Result<(TrackerId, EncounterSummary), RecordingError> {
        if !matches!(
            self.status,
            RecordingStatus::NameAcquired | RecordingStatus::WaitingForName
        ) {
            return Err(self.out_of_sequence("end"));
        }
        let tracker_id = self.next_tracker_id;
        self.next_tracker_id = tracker_id
            .checked_next()
            .ok_or(RecordingError::TrackerIdsExhausted)?;

        let summary = EncounterSummary {
            subject: self.current_id,
            name: self.current_name.clone(),
            begin: self.begin,
            end: signal.time,
            started_at: self.started_at,
        };
        self.status = RecordingStatus::WaitingForReset;
        Ok((tracker_id, summary))
    }

    /// Drop all provisional data and return to `Empty`.
    ///
    /// The tracker id counter is kept. Returns the state that was left.
    pub(crate) fn reset(&mut self) -> RecordingStatus {
        let previous = self.status;
        self.status = RecordingStatus::Empty;
        self.current_id = AgentId::default();
        self.current_name.clear();
        self.begin = EventTime::default();
        self.started_at = NaiveTime::MIN;
        previous
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BOSS: AgentId = AgentId::new(16246);
    const OTHER: AgentId = AgentId::new(9);

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn new_state_is_empty() {
        assert_eq!(RecordingState::new().status(), RecordingStatus::Empty);
    }

    #[test]
    fn reset_from_empty_is_a_no_op() {
        let mut state = RecordingState::new();
        assert_eq!(state.reset(), RecordingStatus::Empty);
        assert_eq!(state.status(), RecordingStatus::Empty);
        assert!(state.start(&EncounterSignal::new(BOSS, 0), noon()).is_ok());
    }

    #[test]
    fn full_cycle_produces_named_summary() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 100), noon()).unwrap();
        assert_eq!(state.status(), RecordingStatus::WaitingForName);

        assert!(state.identify(&IdentityInfo::new(BOSS, "Xera")).unwrap());
        assert_eq!(state.status(), RecordingStatus::NameAcquired);

        let (id, summary) = state.finish(&EncounterSignal::new(BOSS, 900)).unwrap();
        assert_eq!(id, TrackerId::new(0));
        assert_eq!(summary.name, "Xera");
        assert_eq!(summary.subject, BOSS);
        assert_eq!(summary.begin, EventTime::from_millis(100));
        assert_eq!(summary.end, EventTime::from_millis(900));
        assert_eq!(summary.started_at, noon());
        assert_eq!(state.status(), RecordingStatus::WaitingForReset);
    }

    #[test]
    fn end_without_name_yields_empty_name() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        let (_, summary) = state.finish(&EncounterSignal::new(BOSS, 10)).unwrap();
        assert!(summary.name.is_empty());
    }

    #[test]
    fn mismatched_identity_is_ignored() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        assert!(!state.identify(&IdentityInfo::new(OTHER, "Bystander")).unwrap());
        assert_eq!(state.status(), RecordingStatus::WaitingForName);
    }

    #[test]
    fn second_start_keeps_current_recording() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 50), noon()).unwrap();
        let err = state
            .start(&EncounterSignal::new(OTHER, 75), NaiveTime::MIN)
            .unwrap_err();
        assert_eq!(
            err,
            RecordingError::OutOfSequence {
                operation: "start",
                status: RecordingStatus::WaitingForName,
            }
        );

        let (_, summary) = state.finish(&EncounterSignal::new(BOSS, 80)).unwrap();
        assert_eq!(summary.subject, BOSS);
        assert_eq!(summary.begin, EventTime::from_millis(50));
    }

    #[test]
    fn identify_outside_waiting_is_rejected() {
        let mut state = RecordingState::new();
        assert!(state.identify(&IdentityInfo::new(BOSS, "Cairn")).is_err());

        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        state.identify(&IdentityInfo::new(BOSS, "Cairn")).unwrap();
        let err = state.identify(&IdentityInfo::new(BOSS, "Renamed")).unwrap_err();
        assert!(matches!(
            err,
            RecordingError::OutOfSequence {
                status: RecordingStatus::NameAcquired,
                ..
            }
        ));
    }

    #[test]
    fn end_requires_open_encounter() {
        let mut state = RecordingState::new();
        assert!(state.finish(&EncounterSignal::new(BOSS, 0)).is_err());

        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        state.finish(&EncounterSignal::new(BOSS, 5)).unwrap();
        assert!(state.finish(&EncounterSignal::new(BOSS, 6)).is_err());
    }

    #[test]
    fn start_after_end_needs_reset() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        state.finish(&EncounterSignal::new(BOSS, 5)).unwrap();
        assert!(state.start(&EncounterSignal::new(BOSS, 10), noon()).is_err());

        assert_eq!(state.reset(), RecordingStatus::WaitingForReset);
        assert!(state.start(&EncounterSignal::new(BOSS, 10), noon()).is_ok());
    }

    #[test]
    fn reset_discards_provisional_name() {
        let mut state = RecordingState::new();
        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        state.identify(&IdentityInfo::new(BOSS, "Deimos")).unwrap();
        assert_eq!(state.reset(), RecordingStatus::NameAcquired);
        assert_eq!(state.status(), RecordingStatus::Empty);

        state.start(&EncounterSignal::new(OTHER, 0), noon()).unwrap();
        let (_, summary) = state.finish(&EncounterSignal::new(OTHER, 1)).unwrap();
        assert!(summary.name.is_empty());
        assert_eq!(summary.subject, OTHER);
    }

    #[test]
    fn tracker_ids_survive_resets() {
        let mut state = RecordingState::new();
        let mut ids = Vec::new();
        for round in 0..3_u64 {
            state.start(&EncounterSignal::new(BOSS, round), noon()).unwrap();
            if round == 1 {
                // Abandoned encounters do not consume an id.
                state.reset();
                state.start(&EncounterSignal::new(BOSS, round), noon()).unwrap();
            }
            ids.push(state.finish(&EncounterSignal::new(BOSS, round)).unwrap().0);
            state.reset();
        }
        assert_eq!(ids, vec![TrackerId::new(0), TrackerId::new(1), TrackerId::new(2)]);
    }

    #[test]
    fn exhausted_counter_refuses_commit() {
        let mut state = RecordingState {
            next_tracker_id: TrackerId::new(u64::MAX),
            ..RecordingState::default()
        };
        state.start(&EncounterSignal::new(BOSS, 0), noon()).unwrap();
        assert_eq!(
            state.finish(&EncounterSignal::new(BOSS, 1)).unwrap_err(),
            RecordingError::TrackerIdsExhausted
        );
        assert_eq!(state.status(), RecordingStatus::WaitingForName);
    }
}
