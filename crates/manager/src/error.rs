//! crates/manager/src/error.rs
//! Errors surfaced by the log manager.

use std::io;
use std::path::PathBuf;

use logging_sink::SinkError;

/// Reasons [`LogManager::start`](crate::LogManager::start) refuses a
/// configuration.
///
/// The manager's state is unchanged when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The file destination was requested without a directory.
    #[error("file destination requested without a log directory")]
    MissingFileDirectory,

    /// The configured directory exists but is not a directory.
    #[error("log directory {} is not a directory", path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// The log directory could not be created.
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The log file could not be opened for appending.
    #[error("failed to open log file {}: {source}", path.display())]
    OpenFile {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The operating system log cannot be reached.
    #[error("operating system log is unavailable: {0}")]
    OsLogUnavailable(#[source] SinkError),

    /// The delivery worker thread could not be spawned.
    #[error("failed to spawn the delivery worker: {0}")]
    SpawnWorker(#[source] io::Error),
}

/// A destination failed to accept or flush a record.
///
/// Never returned from `write`; delivered to the failure observer, logged
/// through `tracing` and counted in [`DispatchStats`](crate::DispatchStats).
#[derive(Debug, thiserror::Error)]
#[error("delivery to {destination} failed: {source}")]
pub struct WriteError {
    /// Registry name of the failing destination.
    pub destination: String,
    /// What went wrong.
    #[source]
    pub source: SinkError,
}

impl WriteError {
    /// Attributes `source` to `destination`.
    pub fn new(destination: impl Into<String>, source: SinkError) -> Self {
        Self {
            destination: destination.into(),
            source,
        }
    }
}
