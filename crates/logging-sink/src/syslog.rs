// Operating system log backend.
//
// Calls libc `openlog`/`syslog`/`closelog` directly rather than pulling in a
// dedicated syslog crate. Each record becomes one syslog(3) entry whose
// priority is derived from the record's severity.

use std::ffi::CString;
use std::sync::OnceLock;

use logging::{DEFAULT_TAG, Facility, Severity};

/// Syslog facility codes matching the POSIX syslog(3) constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogFacility {
    /// User-level messages (LOG_USER), the default for applications.
    User = libc::LOG_USER,
    /// System daemons (LOG_DAEMON).
    Daemon = libc::LOG_DAEMON,
    /// Reserved for local use (LOG_LOCAL0).
    Local0 = libc::LOG_LOCAL0,
    /// Reserved for local use (LOG_LOCAL1).
    Local1 = libc::LOG_LOCAL1,
    /// Reserved for local use (LOG_LOCAL2).
    Local2 = libc::LOG_LOCAL2,
    /// Reserved for local use (LOG_LOCAL3).
    Local3 = libc::LOG_LOCAL3,
    /// Reserved for local use (LOG_LOCAL4).
    Local4 = libc::LOG_LOCAL4,
    /// Reserved for local use (LOG_LOCAL5).
    Local5 = libc::LOG_LOCAL5,
    /// Reserved for local use (LOG_LOCAL6).
    Local6 = libc::LOG_LOCAL6,
    /// Reserved for local use (LOG_LOCAL7).
    Local7 = libc::LOG_LOCAL7,
}

impl From<Facility> for SyslogFacility {
    fn from(facility: Facility) -> Self {
        match facility {
            Facility::User => Self::User,
            Facility::Daemon => Self::Daemon,
            Facility::Local0 => Self::Local0,
            Facility::Local1 => Self::Local1,
            Facility::Local2 => Self::Local2,
            Facility::Local3 => Self::Local3,
            Facility::Local4 => Self::Local4,
            Facility::Local5 => Self::Local5,
            Facility::Local6 => Self::Local6,
            Facility::Local7 => Self::Local7,
        }
    }
}

/// Syslog priorities used for log records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum SyslogPriority {
    /// Error conditions (LOG_ERR).
    Error = libc::LOG_ERR,
    /// Warning conditions (LOG_WARNING).
    Warning = libc::LOG_WARNING,
    /// Informational messages (LOG_INFO).
    Info = libc::LOG_INFO,
    /// Debug-level messages (LOG_DEBUG).
    Debug = libc::LOG_DEBUG,
}

impl From<Severity> for SyslogPriority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Off | Severity::Error => Self::Error,
            Severity::Warning => Self::Warning,
            Severity::Info => Self::Info,
            Severity::Debug | Severity::Verbose | Severity::All => Self::Debug,
        }
    }
}

/// Opens the syslog connection with `facility` and `tag`.
///
/// syslog(3) keeps the ident pointer, so the first tag is stored in a static
/// for the process lifetime; later calls reuse it.
pub(crate) fn open(facility: SyslogFacility, tag: &str) -> SyslogGuard {
    static IDENT: OnceLock<CString> = OnceLock::new();
    let ident = IDENT.get_or_init(|| {
        CString::new(tag).unwrap_or_else(|_| {
            CString::new(DEFAULT_TAG).expect("default tag contains no NUL bytes")
        })
    });

    // SAFETY: the ident pointer lives in a static `OnceLock<CString>` and is
    // therefore valid for the process lifetime.
    unsafe {
        libc::openlog(ident.as_ptr(), libc::LOG_PID, facility as libc::c_int);
    }

    SyslogGuard { _private: () }
}

/// Sends `message` to syslog(3) with `priority`.
///
/// Interior NUL bytes cannot cross the C boundary and are replaced by spaces.
pub(crate) fn syslog_message(priority: SyslogPriority, message: &str) {
    let Ok(c_message) = CString::new(message.replace('\0', " ")) else {
        return;
    };

    // SAFETY: "%s" keeps `%` in the message from being read as a format
    // directive. Both pointers are valid NUL-terminated strings.
    unsafe {
        libc::syslog(
            priority as libc::c_int,
            c"%s".as_ptr(),
            c_message.as_ptr(),
        );
    }
}

/// Closes the syslog connection when dropped.
#[derive(Debug)]
pub(crate) struct SyslogGuard {
    _private: (),
}

impl Drop for SyslogGuard {
    fn drop(&mut self) {
        // SAFETY: closelog has no preconditions beyond a prior openlog, which
        // the guard's construction guarantees.
        unsafe {
            libc::closelog();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_maps_to_libc_code() {
        assert_eq!(SyslogFacility::from(Facility::default()) as i32, libc::LOG_USER);
        assert_eq!(SyslogFacility::from(Facility::Daemon) as i32, libc::LOG_DAEMON);
        assert_eq!(SyslogFacility::from(Facility::Local7) as i32, libc::LOG_LOCAL7);
    }

    #[test]
    fn severity_maps_to_priority() {
        assert_eq!(SyslogPriority::from(Severity::Error), SyslogPriority::Error);
        assert_eq!(SyslogPriority::from(Severity::Warning), SyslogPriority::Warning);
        assert_eq!(SyslogPriority::from(Severity::Info), SyslogPriority::Info);
        assert_eq!(SyslogPriority::from(Severity::Verbose), SyslogPriority::Debug);
    }
}
