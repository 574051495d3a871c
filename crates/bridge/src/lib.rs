#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `bridge` exposes the log manager through a flat surface that foreign
//! callers can drive without knowing its object model:
//!
//! | C entry point | Operation |
//! |---|---|
//! | `isLoging` | [`Bridge::is_logging`] |
//! | `startLog` | [`Bridge::start`] |
//! | `writeLog` | [`Bridge::write_log`] (UTF-8 text) |
//! | `writeLogWide` | [`Bridge::write_log_wide`] (UTF-16 text) |
//! | `stopLog` | [`Bridge::stop`] |
//! | `logPath` / `logPathFree` | [`Bridge::log_path`] |
//!
//! # Design
//!
//! [`Bridge`] pairs a shared [`LogManager`] with the [`LogConfig`] applied on
//! start. It only converts text; filtering and dispatch stay in the manager.
//! Narrow text is decoded as UTF-8 and wide text as UTF-16, both lossily, so a
//! malformed byte never drops a record.
//!
//! The C functions act on one process-wide bridge. Install it with
//! [`install`] before the first call, or let the first call create it from
//! `MIDILOG_*` environment variables.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use bridge::Bridge;
//! use logging::LogConfig;
//! use logging_sink::MemoryDestination;
//! use manager::LogManager;
//!
//! let manager = Arc::new(LogManager::new());
//! let capture = MemoryDestination::new("capture");
//! manager.attach(capture.clone());
//!
//! let bridge = Bridge::new(Arc::clone(&manager), LogConfig::empty());
//! assert!(bridge.start());
//! bridge.write_log(b"midi", b"note on");
//! let wide: Vec<u16> = "note off".encode_utf16().collect();
//! bridge.write_log_wide(&[0x6d, 0x69, 0x64, 0x69], &wide);
//! bridge.stop();
//!
//! assert_eq!(capture.len(), 2);
//! assert_eq!(capture.records()[1].message(), "note off");
//! ```

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use logging::{Location, LogConfig, LogRecord};
use manager::{LogManager, StopReport, WriteOutcome};

mod ffi;

pub use ffi::{isLoging, logPath, logPathFree, startLog, stopLog, writeLog, writeLogWide};

/// Safe counterpart of the C entry points.
#[derive(Debug)]
pub struct Bridge {
    manager: Arc<LogManager>,
    config: LogConfig,
}

impl Bridge {
    /// Creates a bridge driving `manager` with `config` on start.
    pub fn new(manager: Arc<LogManager>, config: LogConfig) -> Self {
        Self { manager, config }
    }

    /// Creates a bridge over a fresh manager configured from the environment.
    ///
    /// An unreadable environment falls back to the default configuration.
    pub fn from_env() -> Self {
        let config = LogConfig::from_env().unwrap_or_else(|error| {
            tracing::warn!(%error, "ignoring invalid MIDILOG_* configuration");
            LogConfig::default()
        });
        Self::new(Arc::new(LogManager::new()), config)
    }

    /// The driven manager.
    pub fn manager(&self) -> &Arc<LogManager> {
        &self.manager
    }

    /// Configuration applied on start.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Reports whether the manager is running.
    pub fn is_logging(&self) -> bool {
        self.manager.is_active()
    }

    /// Starts the manager; returns `false` when the configuration is refused.
    pub fn start(&self) -> bool {
        match self.manager.start(self.config.clone()) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "startLog failed");
                false
            }
        }
    }

    /// Logs UTF-8 `tag` and `message` at Info severity.
    #[track_caller]
    pub fn write_log(&self, tag: &[u8], message: &[u8]) -> WriteOutcome {
        self.write(
            String::from_utf8_lossy(tag).into_owned(),
            String::from_utf8_lossy(message).into_owned(),
        )
    }

    /// Logs UTF-16 `tag` and `message` at Info severity.
    #[track_caller]
    pub fn write_log_wide(&self, tag: &[u16], message: &[u16]) -> WriteOutcome {
        self.write(
            String::from_utf16_lossy(tag),
            String::from_utf16_lossy(message),
        )
    }

    #[track_caller]
    fn write(&self, tag: String, message: String) -> WriteOutcome {
        self.manager
            .log(LogRecord::new(tag, message).with_location(Location::caller()))
    }

    /// Stops the manager, delivering pending records.
    pub fn stop(&self) -> StopReport {
        self.manager.stop()
    }

    /// Path of the active log file.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.manager.current_file_path()
    }
}

static GLOBAL: OnceLock<Bridge> = OnceLock::new();

/// Installs the bridge used by the C entry points.
///
/// Fails, handing `bridge` back, when a bridge is already in place, either
/// installed earlier or created by a previous C call.
pub fn install(bridge: Bridge) -> Result<(), Bridge> {
    GLOBAL.set(bridge)
}

/// The bridge used by the C entry points, created from the environment on
/// first use.
pub fn global() -> &'static Bridge {
    GLOBAL.get_or_init(Bridge::from_env)
}
