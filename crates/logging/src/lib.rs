#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` holds the data model shared by every midilog crate: ordered
//! [`Severity`] levels, independent [`LogFlag`] categories collected in a
//! [`FlagMask`], the per-severity [`DispatchPolicy`], the immutable
//! [`LogRecord`], and the [`LogConfig`] applied when the manager starts.
//!
//! # Design
//!
//! Everything here is plain data. The only behaviour is the pure
//! [`accepts`] predicate and the [`DispatchPolicy::is_synchronous`] lookup,
//! both safe to call from any thread. State, locking and destinations live in
//! the `manager` and `logging-sink` crates.
//!
//! # Invariants
//!
//! - Severities are totally ordered `Off < Error < Warning < Info < Debug <
//!   Verbose < All`.
//! - A record is accepted iff the threshold is not `Off`, its severity does not
//!   exceed the threshold, and its flag is enabled in the mask.
//! - Records cannot be mutated after construction.
//!
//! # Examples
//!
//! ```
//! use logging::{accepts, DispatchPolicy, FlagMask, LogFlag, LogRecord, Severity};
//!
//! let record = LogRecord::new("net", "connected").with_level(Severity::Debug);
//! assert!(accepts(record.severity(), record.flag(), Severity::All, FlagMask::ALL));
//! assert!(!DispatchPolicy::default().is_synchronous(record.severity()));
//! ```

mod config;
mod levels;
mod policy;
mod record;

pub use config::{ConfigError, DEFAULT_TAG, DestinationKind, ENV_PREFIX, Facility, LogConfig};
pub use levels::{FlagMask, LogFlag, ParseLevelError, Severity, accepts};
pub use policy::{DispatchMode, DispatchPolicy};
pub use record::{Location, LogRecord};
