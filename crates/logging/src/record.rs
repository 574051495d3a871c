//! crates/logging/src/record.rs
//! Immutable log record created at the call site.

use std::borrow::Cow;
use std::time::SystemTime;

use super::levels::{LogFlag, Severity};

/// Source position of the statement that produced a record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    file: Cow<'static, str>,
    function: Cow<'static, str>,
    line: u32,
}

impl Location {
    /// Creates a location from static call-site data, as captured by macros.
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file: Cow::Borrowed(file),
            function: Cow::Borrowed(function),
            line,
        }
    }

    /// Creates a location from owned strings, e.g. when bridging foreign callers.
    pub fn owned(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            file: Cow::Owned(file.into()),
            function: Cow::Owned(function.into()),
            line,
        }
    }

    /// Captures the location of the caller.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), "", location.line())
    }

    /// Source file path.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Enclosing function or module path; empty when unknown.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Line number; zero when unknown.
    pub const fn line(&self) -> u32 {
        self.line
    }
}

/// A single log entry.
///
/// Records are immutable once built. The manager clones them into the
/// delivery queue and drops them after every destination has seen them.
#[derive(Clone, Debug)]
pub struct LogRecord {
    tag: String,
    message: String,
    severity: Severity,
    flag: LogFlag,
    location: Location,
    timestamp: SystemTime,
}

impl LogRecord {
    /// Creates an info-level record stamped with the current time.
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
            severity: Severity::Info,
            flag: LogFlag::Info,
            location: Location::default(),
            timestamp: SystemTime::now(),
        }
    }

    /// Sets the severity, keeping the flag unchanged.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the category flag.
    #[must_use]
    pub fn with_flag(mut self, flag: LogFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Sets severity and the matching flag in one step.
    ///
    /// `Off` and `All` have no flag; the current flag is kept for them.
    #[must_use]
    pub fn with_level(self, severity: Severity) -> Self {
        let flag = severity.flag().unwrap_or(self.flag);
        self.with_severity(severity).with_flag(flag)
    }

    /// Attaches the call-site location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Overrides the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Logical source of the record.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity of the record.
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Category flag of the record.
    pub const fn flag(&self) -> LogFlag {
        self.flag
    }

    /// Call-site location.
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Creation time.
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn new_record_defaults_to_info() {
        let record = LogRecord::new("net", "connected");
        assert_eq!(record.tag(), "net");
        assert_eq!(record.message(), "connected");
        assert_eq!(record.severity(), Severity::Info);
        assert_eq!(record.flag(), LogFlag::Info);
        assert_eq!(record.location().line(), 0);
    }

    #[test]
    fn with_level_sets_matching_flag() {
        let record = LogRecord::new("x", "y").with_level(Severity::Debug);
        assert_eq!(record.severity(), Severity::Debug);
        assert_eq!(record.flag(), LogFlag::Debug);

        let record = record.with_level(Severity::All);
        assert_eq!(record.severity(), Severity::All);
        assert_eq!(record.flag(), LogFlag::Debug);
    }

    #[test]
    fn severity_and_flag_are_independent() {
        let record = LogRecord::new("x", "y")
            .with_severity(Severity::Error)
            .with_flag(LogFlag::Verbose);
        assert_eq!(record.severity(), Severity::Error);
        assert_eq!(record.flag(), LogFlag::Verbose);
    }

    #[test]
    fn caller_location_points_here() {
        let location = Location::caller();
        assert!(location.file().ends_with("record.rs"));
        assert!(location.line() > 0);
    }

    #[test]
    fn timestamp_override() {
        let when = UNIX_EPOCH + Duration::from_secs(86_400);
        let record = LogRecord::new("x", "y").with_timestamp(when);
        assert_eq!(record.timestamp(), when);
    }

    #[test]
    fn owned_location_round_trips_fields() {
        let location = Location::owned("main.c", "main", 12);
        assert_eq!(location.file(), "main.c");
        assert_eq!(location.function(), "main");
        assert_eq!(location.line(), 12);
    }
}
