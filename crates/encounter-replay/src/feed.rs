//! Feed parsing and the producer side of a replay.
//!
//! A feed is a JSON-lines file with one [`FeedEvent`] per line. Blank lines
//! and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encounter_history::{History, PayloadSource, RecordingError};
use encounter_types::FeedEvent;
use tracing::{debug, warn};

use crate::error::ReplayError;

/// Counters for one pass over a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events that changed the recording state.
    pub applied: u64,
    /// Events the state machine refused or that named another identity.
    pub ignored: u64,
    /// Encounters committed to the history.
    pub committed: u64,
}

/// What the history did with a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event changed the recording state.
    Applied,
    /// The event ended an encounter and committed it.
    Committed,
    /// The event did not fit the current state.
    Ignored,
}

/// Read and parse a feed file.
pub fn read_feed(path: &Path) -> Result<Vec<FeedEvent>, ReplayError> {
    let file = File::open(path)?;
    parse_feed(BufReader::new(file))
}

/// Parse feed events from a reader.
pub fn parse_feed<R: BufRead>(reader: R) -> Result<Vec<FeedEvent>, ReplayError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: index.saturating_add(1),
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Deliver one event to the history.
pub fn apply_event<S: PayloadSource>(history: &History<S>, event: &FeedEvent) -> Outcome {
    let result: Result<Outcome, RecordingError> = match event {
        FeedEvent::Start(signal) => history.log_start(signal).map(|()| Outcome::Applied),
        FeedEvent::Identity(info) => history.resolve_identity(info).map(|matched| {
            if matched {
                Outcome::Applied
            } else {
                Outcome::Ignored
            }
        }),
        FeedEvent::End(signal) => history.log_end(signal).map(|_| Outcome::Committed),
        FeedEvent::Reset(signal) => {
            history.reset(signal);
            Ok(Outcome::Applied)
        }
    };
    match result {
        Ok(outcome) => outcome,
        Err(RecordingError::TrackerIdsExhausted) => {
            warn!("Tracker ids exhausted, dropping encounter");
            Outcome::Ignored
        }
        Err(err) => {
            debug!(kind = event.kind(), %err, "Feed event ignored");
            Outcome::Ignored
        }
    }
}

/// Deliver every event in order and tally the outcomes.
pub fn replay<S: PayloadSource>(history: &History<S>, events: &[FeedEvent]) -> ReplayStats {
    let mut stats = ReplayStats::default();
    for event in events {
        match apply_event(history, event) {
            Outcome::Applied => stats.applied = stats.applied.saturating_add(1),
            Outcome::Committed => {
                stats.applied = stats.applied.saturating_add(1);
                stats.committed = stats.committed.saturating_add(1);
            }
            Outcome::Ignored => stats.ignored = stats.ignored.saturating_add(1),
        }
    }
    stats
}
