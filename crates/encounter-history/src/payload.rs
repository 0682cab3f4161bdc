//! Payload source trait and the empty implementation.
//!
//! Whatever enriches an encounter with its substantive statistics lives
//! outside the history. At commit time the history hands the assembled
//! [`EncounterSummary`] to a [`PayloadSource`] and stores whatever it
//! returns alongside the record, without inspecting it.

use encounter_types::EncounterSummary;

/// Produces the opaque payload attached to each committed record.
///
/// Called on the producer thread while the recording lock is held but
/// before the entries lock is taken, so slow implementations delay the
/// producer without blocking readers.
pub trait PayloadSource: Send + Sync {
    /// The payload stored in each record.
    type Payload: Send;

    /// Build the payload for the encounter described by `summary`.
    fn collect(&self, summary: &EncounterSummary) -> Self::Payload;
}

/// A payload source that attaches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPayload;

impl PayloadSource for NoPayload {
    type Payload = ();

    fn collect(&self, _summary: &EncounterSummary) -> Self::Payload {}
}
