//! Bounded, thread-safe history of completed encounters.
//!
//! A producer thread feeds start / identify / end / reset signals into a
//! [`History`]. The recording state machine assembles one record per
//! encounter and commits it into a capped, insertion-ordered buffer. Any
//! number of consumer threads read the buffer through an [`EntriesGuard`]
//! that keeps the lock held for a whole batch of reads.
//!
//! # Modules
//!
//! - [`buffer`] -- The capped, insertion-ordered record buffer.
//! - [`clock`] -- [`WallClock`] trait with system and fixed implementations.
//! - [`config`] -- Configuration loading from YAML into typed structs.
//! - [`guard`] -- Held and deferred entry locks.
//! - [`history`] -- The [`History`] facade tying the pieces together.
//! - [`payload`] -- [`PayloadSource`] trait and [`NoPayload`].
//! - [`recording`] -- The recording state machine.
//!
//! # Lock order
//!
//! A history owns two mutexes. The recording lock guards the state machine
//! and the tracker id counter; the entries lock guards the buffer. When both
//! are needed the recording lock is always taken first. Consumers only ever
//! take the entries lock.
//!
//! # Usage
//!
//! ```
//! use encounter_history::{History, HistoryConfig};
//! use encounter_types::{AgentId, EncounterSignal, IdentityInfo};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let history = History::new(&HistoryConfig::default())?;
//! let boss = AgentId::new(15438);
//!
//! history.log_start(&EncounterSignal::new(boss, 1_000))?;
//! history.resolve_identity(&IdentityInfo::new(boss, "Vale Guardian"))?;
//! history.log_end(&EncounterSignal::new(boss, 61_000))?;
//! history.reset(&EncounterSignal::new(boss, 61_500));
//!
//! let guard = history.lock();
//! assert_eq!(guard.len(), 1);
//! assert_eq!(
//!     guard.iter().next().map(|record| record.summary.name.as_str()),
//!     Some("Vale Guardian"),
//! );
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod clock;
pub mod config;
pub mod guard;
pub mod history;
pub mod payload;
pub mod recording;

// Re-export primary types at crate root.
pub use buffer::HistoryBuffer;
pub use clock::{FixedWallClock, SystemWallClock, WallClock};
pub use config::{ConfigError, HistoryConfig, LoggingConfig};
pub use guard::{DeferredEntriesLock, EntriesGuard};
pub use history::{History, SharedHistory};
pub use payload::{NoPayload, PayloadSource};
pub use recording::{RecordingError, RecordingStatus};
