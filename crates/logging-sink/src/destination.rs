use std::path::Path;

use logging::LogRecord;

use crate::error::SinkError;

/// Opaque consumer of accepted log records.
///
/// The manager forwards every record that passed its filter to each
/// registered destination. Destinations are identified by [`name`](Self::name);
/// registering a second destination with the same name is a no-op, so the
/// name must be stable for the lifetime of the value.
///
/// Implementations are driven from the caller's thread for synchronous
/// records and from the delivery worker for deferred ones, never from both at
/// once.
pub trait Destination: Send {
    /// Registry name, e.g. `"file"`.
    fn name(&self) -> &str;

    /// Consumes one record.
    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError>;

    /// Pushes buffered output to durable storage.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Path backing the destination, for file-based sinks.
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<D> Destination for Box<D>
where
    D: Destination + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        (**self).accept(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}
