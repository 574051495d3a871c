//! Operating system log destination.

use logging::{DestinationKind, Facility, LogRecord};

use crate::destination::Destination;
use crate::error::SinkError;
#[cfg(unix)]
use crate::sink::sanitize_tag;
#[cfg(unix)]
use crate::syslog::{self, SyslogFacility, SyslogGuard, SyslogPriority};

/// Forwards records to the platform log (syslog on Unix).
///
/// Each record becomes `"[tag] message"` at the priority matching its
/// severity. Only one instance should be open at a time; dropping it closes
/// the connection.
#[derive(Debug)]
pub struct OsLogDestination {
    #[cfg(unix)]
    _guard: SyslogGuard,
}

impl OsLogDestination {
    /// Opens the platform log under `tag`.
    ///
    /// `facility` selects the syslog facility; it is ignored where syslog is
    /// unavailable.
    pub fn open(tag: &str, facility: Facility) -> Result<Self, SinkError> {
        #[cfg(unix)]
        {
            Ok(Self {
                _guard: syslog::open(SyslogFacility::from(facility), tag),
            })
        }
        #[cfg(not(unix))]
        {
            let _ = (tag, facility);
            Err(SinkError::Unsupported("os log"))
        }
    }
}

impl Destination for OsLogDestination {
    fn name(&self) -> &str {
        DestinationKind::Os.name()
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        #[cfg(unix)]
        {
            let line = format!("[{}] {}", sanitize_tag(record.tag()), record.message());
            syslog::syslog_message(SyslogPriority::from(record.severity()), &line);
            Ok(())
        }
        #[cfg(not(unix))]
        {
            let _ = record;
            Err(SinkError::Unsupported("os log"))
        }
    }
}
