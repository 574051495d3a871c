//! Errors raised by destinations.

use std::io;

/// Failure of a single destination to accept or flush a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("{destination}: {source}")]
    Io {
        /// Name of the failing destination.
        destination: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The destination was closed and can no longer accept records.
    #[error("destination {0} is closed")]
    Closed(String),

    /// The destination is not available on this platform.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// A custom destination refused the record.
    #[error("{destination} rejected record: {reason}")]
    Rejected {
        /// Name of the refusing destination.
        destination: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl SinkError {
    /// Creates an I/O error attributed to `destination`.
    pub fn io(destination: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            destination: destination.into(),
            source,
        }
    }
}

/// Maps I/O results to [`SinkError::Io`] with the destination name attached.
pub(crate) trait IoResultExt<T> {
    fn for_destination(self, destination: &str) -> Result<T, SinkError>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn for_destination(self, destination: &str) -> Result<T, SinkError> {
        self.map_err(|error| SinkError::io(destination, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_destination() {
        let error = SinkError::io("file", io::Error::other("disk full"));
        let display = error.to_string();
        assert!(display.contains("file"));
        assert!(display.contains("disk full"));
    }

    #[test]
    fn extension_attaches_destination() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        match result.for_destination("tty") {
            Err(SinkError::Io { destination, source }) => {
                assert_eq!(destination, "tty");
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
