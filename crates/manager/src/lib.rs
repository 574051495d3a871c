#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `manager` owns the lifecycle of the midilog facility. A [`LogManager`] is
//! either idle or running. While running it filters each record against the
//! configured severity threshold and flag mask, then either forwards it to
//! every registered destination on the caller's thread or queues it for a
//! single delivery thread, as the [`DispatchPolicy`] dictates.
//!
//! # Design
//!
//! - Configuration and lifecycle state sit behind an `RwLock`. Writes share it;
//!   [`LogManager::start`] and [`LogManager::stop`] are serialised by their own
//!   mutex and hold the `RwLock` exclusively only while swapping state, never
//!   while waiting on the delivery thread or calling the failure observer.
//! - The [`Registry`] sits behind a mutex shared with the delivery thread
//!   (`midilog-delivery`), which consumes an unbounded crossbeam channel in
//!   enqueue order and flushes destinations whenever the queue runs dry.
//! - Synchronous records are forwarded and flushed before `write` returns.
//!
//! # Invariants
//!
//! - A record is accepted iff the threshold is not `Off`, its severity does not
//!   exceed the threshold, and its flag is enabled in the mask.
//! - Writes while idle have no effect.
//! - After [`LogManager::stop`] returns, every record accepted before it has
//!   been delivered and nothing further is delivered.
//! - At most one destination per name is registered.
//!
//! # Errors
//!
//! [`ConfigurationError`] is returned by `start` and leaves the manager
//! unchanged. Destination failures never fail a write: they are collected as
//! [`WriteError`] values, logged through `tracing`, counted in
//! [`DispatchStats`] and passed to the optional failure observer.
//!
//! # Examples
//!
//! ```
//! use logging::{DestinationKind, LogConfig, Severity};
//! use manager::{LogManager, log_error};
//!
//! let dir = tempfile::tempdir()?;
//! let manager = LogManager::new();
//! manager.start(
//!     LogConfig::empty()
//!         .with_destination(DestinationKind::File)
//!         .with_file_directory(dir.path())
//!         .with_threshold(Severity::Debug),
//! )?;
//!
//! manager.write("net", "connected");
//! log_error!(manager, "net", "lost {} packets", 3);
//! let path = manager.current_file_path().expect("file destination");
//! manager.stop();
//!
//! let contents = std::fs::read_to_string(path)?;
//! assert!(contents.contains("[I] [net] connected"));
//! assert!(contents.contains("[E] [net] lost 3 packets"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod macros;
mod manager;
mod registry;
mod shared;
mod stats;
#[cfg(feature = "subscriber")]
mod tracing_bridge;
mod worker;

pub use error::{ConfigurationError, WriteError};
pub use manager::{LogManager, LogManagerBuilder, StopReport, WriteOutcome};
pub use registry::{ForwardReport, Registry};
pub use stats::DispatchStats;
#[cfg(feature = "subscriber")]
pub use tracing_bridge::ManagerLayer;

pub use logging::{
    DestinationKind, DispatchMode, DispatchPolicy, FlagMask, Location, LogConfig, LogFlag,
    LogRecord, Severity,
};
