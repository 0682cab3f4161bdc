//! Shared type definitions for the encounter history.
//!
//! This crate is the single source of truth for the values that flow
//! between the event source, the recording state machine, and the
//! consumers that read committed history.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for subject and tracker identifiers
//! - [`signal`] -- Notifications delivered by the event source
//! - [`record`] -- Assembled summaries and committed encounter records

pub mod ids;
pub mod record;
pub mod signal;

// Re-export all public types at crate root for convenience.
pub use ids::{AgentId, TrackerId};
pub use record::{EncounterRecord, EncounterSummary};
pub use signal::{EncounterSignal, EventTime, FeedEvent, IdentityInfo};
