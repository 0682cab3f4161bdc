//! Error types for the replay binary.
//!
//! [`ReplayError`] wraps every failure mode between argument parsing and
//! the final report so `main` can propagate with `?`.

/// Top-level error for the replay binary.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The command line was not understood.
    #[error("usage: encounter-replay <feed.jsonl> [config.yaml] ({message})")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: encounter_history::ConfigError,
    },

    /// The feed file could not be read.
    #[error("feed I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A feed line was not a valid event.
    #[error("feed line {line}: {source}")]
    Parse {
        /// 1-based line number in the feed.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A worker thread panicked.
    #[error("{role} thread panicked")]
    ThreadPanicked {
        /// Which worker failed.
        role: &'static str,
    },
}
