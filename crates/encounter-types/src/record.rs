//! Assembled encounter summaries and committed records.
//!
//! An [`EncounterSummary`] is everything the recording state machine knows
//! about an encounter when it ends. An [`EncounterRecord`] is that summary
//! stamped with its [`TrackerId`] and carrying an opaque payload produced by
//! whatever enriches encounters with their substantive statistics.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, TrackerId};
use crate::signal::EventTime;

/// The provisional fields of an encounter, frozen at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSummary {
    /// Provisional identity captured at start.
    pub subject: AgentId,
    /// Resolved display name, empty if no identity was resolved.
    pub name: String,
    /// Event-source timestamp of the start signal.
    pub begin: EventTime,
    /// Event-source timestamp of the end signal.
    pub end: EventTime,
    /// Local wall-clock time of day when the encounter started.
    pub started_at: NaiveTime,
}

impl EncounterSummary {
    /// Length of the encounter in milliseconds (0 if the end precedes the
    /// begin).
    pub const fn duration_ms(&self) -> u64 {
        self.end.saturating_elapsed_since(self.begin)
    }

    /// Label for display: the resolved name, or `#<subject>` when none was
    /// resolved.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("#{}", self.subject)
        } else {
            self.name.clone()
        }
    }
}

/// A committed, immutable encounter.
///
/// `P` is the payload type attached by the history's payload source. The
/// history never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterRecord<P = ()> {
    /// Unique, monotonically assigned tracker id.
    pub tracker_id: TrackerId,
    /// What the state machine assembled.
    pub summary: EncounterSummary,
    /// Opaque enrichment.
    pub payload: P,
}

impl<P> EncounterRecord<P> {
    /// Shorthand for `self.summary.duration_ms()`.
    pub const fn duration_ms(&self) -> u64 {
        self.summary.duration_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, begin: u64, end: u64) -> EncounterSummary {
        EncounterSummary {
            subject: AgentId::new(15438),
            name: name.to_owned(),
            begin: EventTime::from_millis(begin),
            end: EventTime::from_millis(end),
            started_at: NaiveTime::MIN,
        }
    }

    #[test]
    fn duration_is_end_minus_begin() {
        assert_eq!(summary("Gorseval", 1_000, 61_000).duration_ms(), 60_000);
    }

    #[test]
    fn duration_never_underflows() {
        assert_eq!(summary("Gorseval", 9_000, 1_000).duration_ms(), 0);
    }

    #[test]
    fn display_name_falls_back_to_subject() {
        assert_eq!(summary("", 0, 1).display_name(), "#15438");
        assert_eq!(summary("Sabetha", 0, 1).display_name(), "Sabetha");
    }

    #[test]
    fn record_delegates_duration() {
        let record = EncounterRecord {
            tracker_id: TrackerId::new(3),
            summary: summary("Slothasor", 100, 350),
            payload: (),
        };
        assert_eq!(record.duration_ms(), 250);
    }
}
