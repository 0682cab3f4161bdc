//! The consumer side of a replay.
//!
//! Polls the shared history while the producer runs, logging each newly
//! committed record it notices. Each poll holds the entries lock only long
//! enough to read the newest record.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use encounter_history::{History, PayloadSource};
use encounter_types::TrackerId;
use tracing::debug;

/// Delay between polls.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Watch `history` until `done` is set, returning how many distinct newest
/// records were observed.
///
/// Commits that land between two polls are coalesced, so the count is a
/// lower bound on the number of commits.
pub fn watch<S: PayloadSource>(history: &History<S>, done: &AtomicBool) -> u64 {
    let mut last_seen: Option<TrackerId> = None;
    let mut observed: u64 = 0;
    loop {
        let finished = done.load(Ordering::Acquire);
        {
            let guard = history.lock();
            let latest = guard.latest().map(|record| record.tracker_id);
            if latest != last_seen {
                if let Some(tracker_id) = latest {
                    debug!(%tracker_id, retained = guard.len(), "Observed new encounter");
                    observed = observed.saturating_add(1);
                }
                last_seen = latest;
            }
        }
        if finished {
            return observed;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
