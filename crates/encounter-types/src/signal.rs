//! Notifications delivered by the event source.
//!
//! The event source reports three kinds of lifecycle signal (start, end,
//! reset) that all carry the subject's provisional identity and a coarse
//! timestamp, plus identity-resolution notifications that attach a display
//! name to a subject. [`FeedEvent`] bundles them for replay from a
//! serialized feed.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// Coarse timestamp on the event source's clock, in milliseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventTime(pub u64);

impl EventTime {
    /// Wrap a raw millisecond value.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Return the raw millisecond value.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Returns 0 when `earlier` is actually later; the event source does
    /// not guarantee monotonic delivery.
    pub const fn saturating_elapsed_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl core::fmt::Display for EventTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A start, end, or reset notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSignal {
    /// Provisional identity of the encounter subject.
    pub subject: AgentId,
    /// When the event source observed the signal.
    pub time: EventTime,
}

impl EncounterSignal {
    /// Create a signal for `subject` at `time` milliseconds.
    pub const fn new(subject: AgentId, time: u64) -> Self {
        Self {
            subject,
            time: EventTime(time),
        }
    }
}

/// Identity-resolution notification: a display name keyed by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    /// The identity being described.
    pub id: AgentId,
    /// Display name for the identity.
    pub name: String,
}

impl IdentityInfo {
    /// Create an identity notification.
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One entry of a recorded event-source feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
    /// An encounter started.
    Start(EncounterSignal),
    /// An identity was resolved.
    Identity(IdentityInfo),
    /// An encounter ended.
    End(EncounterSignal),
    /// The event source asked for the in-progress encounter to be dropped.
    Reset(EncounterSignal),
}

impl FeedEvent {
    /// Short lowercase name of the event kind, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Identity(_) => "identity",
            Self::End(_) => "end",
            Self::Reset(_) => "reset",
        }
    }
}
