#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging-sink` provides the [`Destination`] capability the manager forwards
//! accepted records to, the [`RecordSink`] renderer shared by the text-based
//! destinations, and the built-in destinations:
//!
//! | Destination | Registry name | Output |
//! |---|---|---|
//! | [`ConsoleDestination`] | `asl` | standard error |
//! | [`TtyDestination`] | `tty` | standard output, coloured on a terminal |
//! | [`OsLogDestination`] | `os` | syslog(3) on Unix |
//! | [`FileDestination`] | `file` | append-only file |
//! | [`MemoryDestination`] | caller-chosen | shared in-memory buffer |
//!
//! # Design
//!
//! Destinations know nothing about filtering or dispatch. They accept one
//! record at a time through `&mut self`; the manager serialises access.
//! [`RecordSink`] renders a record into a reusable scratch buffer and issues a
//! single `write_all` per line.
//!
//! # Errors
//!
//! Every failure is a [`SinkError`] naming the destination. The manager
//! collects these instead of propagating them to callers of `write`.
//!
//! # Examples
//!
//! ```
//! use logging::LogRecord;
//! use logging_sink::{Destination, TtyDestination};
//!
//! let mut tty = TtyDestination::with_writer(Vec::new(), false);
//! tty.accept(&LogRecord::new("midi", "note on"))?;
//! let text = String::from_utf8(tty.into_inner()).unwrap();
//! assert!(text.ends_with("[I] [midi] note on\n"));
//! # Ok::<(), logging_sink::SinkError>(())
//! ```

mod console;
mod destination;
mod error;
mod file;
mod memory;
mod os_log;
mod sink;

/// Raw syslog(3) facility and priority types.
#[cfg(unix)]
#[allow(unsafe_code)]
pub mod syslog;

pub use console::{ConsoleDestination, TtyDestination};
pub use destination::Destination;
pub use error::SinkError;
pub use file::{FileDestination, default_file_name};
pub use memory::MemoryDestination;
pub use os_log::OsLogDestination;
pub use sink::{RecordSink, Style};
