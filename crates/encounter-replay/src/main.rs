//! Replays a recorded encounter feed through a shared history.
//!
//! This binary is the composition root for the encounter history: it builds
//! one [`History`] and hands the same shared handle to a producer thread,
//! which feeds it events from a JSON-lines file, and to a consumer thread,
//! which reads it concurrently. When the feed is exhausted the retained
//! history is printed oldest first.
//!
//! # Startup Sequence
//!
//! 1. Parse arguments: `encounter-replay <feed.jsonl> [config.yaml]`
//! 2. Load configuration (argument, then `ENCOUNTER_CONFIG`, then defaults)
//! 3. Initialize structured logging (tracing)
//! 4. Read and parse the feed
//! 5. Run producer and consumer threads against the shared history
//! 6. Print the report

mod error;
mod feed;
mod monitor;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use encounter_history::{History, HistoryConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ReplayError;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "ENCOUNTER_CONFIG";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if arguments, configuration, or the feed are invalid,
/// or if a worker thread panics.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (feed_path, config_path) = parse_args(std::env::args().skip(1))?;

    // Configuration first: it supplies the default log level.
    let config = load_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        capacity = config.capacity,
        feed = %feed_path.display(),
        "encounter-replay starting"
    );

    let events = feed::read_feed(&feed_path)?;
    info!(events = events.len(), "Feed loaded");

    let history = History::new(&config)?.into_shared();
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let history = Arc::clone(&history);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let stats = feed::replay(&history, &events);
            done.store(true, Ordering::Release);
            stats
        })
    };
    let consumer = {
        let history = Arc::clone(&history);
        let done = Arc::clone(&done);
        thread::spawn(move || monitor::watch(&history, &done))
    };

    let stats = producer
        .join()
        .map_err(|_err| ReplayError::ThreadPanicked { role: "producer" })?;
    let observed = consumer
        .join()
        .map_err(|_err| ReplayError::ThreadPanicked { role: "consumer" })?;

    info!(
        applied = stats.applied,
        ignored = stats.ignored,
        committed = stats.committed,
        observed,
        "Replay finished"
    );

    let guard = history.lock();
    print!("{}", report::Report::new(guard.iter()));
    Ok(())
}

/// Split the command line into the feed path and an optional config path.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(PathBuf, Option<PathBuf>), ReplayError> {
    let feed = args.next().ok_or_else(|| ReplayError::Usage {
        message: "missing feed path".to_owned(),
    })?;
    let config = args.next().map(PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(ReplayError::Usage {
            message: format!("unexpected argument {extra:?}"),
        });
    }
    Ok((PathBuf::from(feed), config))
}

/// Load configuration from `path`, else `ENCOUNTER_CONFIG`, else defaults.
fn load_config(path: Option<&Path>) -> Result<HistoryConfig, ReplayError> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = match path.or(from_env.as_deref()) {
        Some(path) => HistoryConfig::from_file(path)?,
        None => {
            let mut config = HistoryConfig::default();
            config.apply_env_overrides();
            config.validated_capacity()?;
            config
        }
    };
    Ok(config)
}
