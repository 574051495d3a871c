//! In-memory destination that collects records for later inspection.

use std::sync::{Arc, Mutex, MutexGuard};

use logging::LogRecord;

use crate::destination::Destination;
use crate::error::SinkError;

/// Collects every accepted record in a shared buffer.
///
/// Clones share the buffer: attach one clone to the manager and keep another
/// to [`drain`](Self::drain) what was delivered.
///
/// # Examples
///
/// ```
/// use logging::LogRecord;
/// use logging_sink::{Destination, MemoryDestination};
///
/// let memory = MemoryDestination::new("capture");
/// let mut attached = memory.clone();
/// attached.accept(&LogRecord::new("net", "connected")).unwrap();
///
/// let records = memory.drain();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].message(), "connected");
/// assert!(memory.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct MemoryDestination {
    name: String,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryDestination {
    /// Creates an empty collector registered under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().expect("memory destination mutex poisoned")
    }

    /// Number of collected records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of the collected records in delivery order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Removes and returns the collected records in delivery order.
    pub fn drain(&self) -> Vec<LogRecord> {
        self.lock().drain(..).collect()
    }
}

impl Destination for MemoryDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let memory = MemoryDestination::new("capture");
        let mut attached = memory.clone();
        attached.accept(&LogRecord::new("a", "1")).unwrap();
        attached.accept(&LogRecord::new("b", "2")).unwrap();

        assert_eq!(memory.len(), 2);
        let messages: Vec<_> = memory
            .records()
            .iter()
            .map(|record| record.message().to_string())
            .collect();
        assert_eq!(messages, ["1", "2"]);
    }

    #[test]
    fn drain_clears_buffer() {
        let mut memory = MemoryDestination::new("capture");
        memory.accept(&LogRecord::new("a", "1")).unwrap();
        assert_eq!(memory.drain().len(), 1);
        assert!(memory.drain().is_empty());
    }

    #[test]
    fn name_is_configurable() {
        assert_eq!(MemoryDestination::new("remote").name(), "remote");
    }
}
