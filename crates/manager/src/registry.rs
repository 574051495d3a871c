//! crates/manager/src/registry.rs
//! Set of destinations that receive accepted records.

use std::fmt;
use std::path::PathBuf;

use logging::LogRecord;
use logging_sink::Destination;

use crate::error::WriteError;

/// Result of forwarding one record to every registered destination.
#[derive(Debug, Default)]
pub struct ForwardReport {
    /// Destinations that accepted the record.
    pub delivered: usize,
    /// Destinations that failed, in registration order.
    pub failures: Vec<WriteError>,
}

impl ForwardReport {
    /// Reports whether every destination accepted the record.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered collection of destinations keyed by [`Destination::name`].
///
/// The registry does not filter; it hands every record to every destination
/// in registration order. A failing destination never keeps the others from
/// receiving the record.
///
/// # Examples
///
/// ```
/// use logging::LogRecord;
/// use logging_sink::MemoryDestination;
/// use manager::Registry;
///
/// let capture = MemoryDestination::new("capture");
/// let mut registry = Registry::new();
/// assert!(registry.register(Box::new(capture.clone())));
/// assert!(!registry.register(Box::new(MemoryDestination::new("capture"))));
///
/// let report = registry.forward(&LogRecord::new("midi", "clock"));
/// assert_eq!(report.delivered, 1);
/// assert_eq!(capture.len(), 1);
/// ```
#[derive(Default)]
pub struct Registry {
    destinations: Vec<Box<dyn Destination>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `destination` unless one with the same name is present.
    ///
    /// Returns `false` (dropping `destination`) on a duplicate name.
    pub fn register(&mut self, destination: Box<dyn Destination>) -> bool {
        if self.contains(destination.name()) {
            return false;
        }
        self.destinations.push(destination);
        true
    }

    /// Removes and returns the destination registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn Destination>> {
        let index = self
            .destinations
            .iter()
            .position(|destination| destination.name() == name)?;
        Some(self.destinations.remove(index))
    }

    /// Hands `record` to every destination.
    pub fn forward(&mut self, record: &LogRecord) -> ForwardReport {
        let mut report = ForwardReport::default();
        for destination in &mut self.destinations {
            match destination.accept(record) {
                Ok(()) => report.delivered += 1,
                Err(source) => report
                    .failures
                    .push(WriteError::new(destination.name(), source)),
            }
        }
        report
    }

    /// Flushes every destination, returning the failures.
    pub fn flush_all(&mut self) -> Vec<WriteError> {
        self.destinations
            .iter_mut()
            .filter_map(|destination| {
                destination
                    .flush()
                    .err()
                    .map(|source| WriteError::new(destination.name(), source))
            })
            .collect()
    }

    /// Flushes and unregisters every destination.
    pub fn drain(&mut self) -> Vec<WriteError> {
        let failures = self.flush_all();
        self.destinations.clear();
        failures
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.destinations
            .iter()
            .map(|destination| destination.name())
            .collect()
    }

    /// Reports whether a destination named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.destinations
            .iter()
            .any(|destination| destination.name() == name)
    }

    /// Number of registered destinations.
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Reports whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Path of the first registered file-backed destination.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.destinations
            .iter()
            .find_map(|destination| destination.path())
            .map(|path| path.to_path_buf())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("destinations", &self.names())
            .finish()
    }
}
