//! crates/manager/src/macros.rs
//! Severity-specific logging macros.
//!
//! Each macro formats its arguments, stamps the record with `file!()`,
//! `module_path!()` and `line!()`, and hands it to
//! [`LogManager::log`](crate::LogManager::log). Each evaluates to the
//! resulting [`WriteOutcome`](crate::WriteOutcome).

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($manager:expr, $severity:ident, $tag:expr, $($arg:tt)+) => {
        $manager.log(
            $crate::LogRecord::new($tag, ::std::format!($($arg)+))
                .with_level($crate::Severity::$severity)
                .with_location($crate::Location::new(
                    ::std::file!(),
                    ::std::module_path!(),
                    ::std::line!(),
                )),
        )
    };
}

/// Logs at Error severity.
///
/// # Example
/// ```
/// use manager::{LogManager, log_error};
///
/// let manager = LogManager::new();
/// log_error!(manager, "midi", "port {} vanished", 3);
/// ```
#[macro_export]
macro_rules! log_error {
    ($manager:expr, $tag:expr, $($arg:tt)+) => {
        $crate::__log_at!($manager, Error, $tag, $($arg)+)
    };
}

/// Logs at Warning severity.
///
/// # Example
/// ```ignore
/// log_warn!(manager, "midi", "dropped {} bytes", count);
/// ```
#[macro_export]
macro_rules! log_warn {
    ($manager:expr, $tag:expr, $($arg:tt)+) => {
        $crate::__log_at!($manager, Warning, $tag, $($arg)+)
    };
}

/// Logs at Info severity.
///
/// # Example
/// ```ignore
/// log_info!(manager, "session", "connected to {}", peer);
/// ```
#[macro_export]
macro_rules! log_info {
    ($manager:expr, $tag:expr, $($arg:tt)+) => {
        $crate::__log_at!($manager, Info, $tag, $($arg)+)
    };
}

/// Logs at Debug severity.
///
/// # Example
/// ```ignore
/// log_debug!(manager, "clock", "tick {}", tick);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($manager:expr, $tag:expr, $($arg:tt)+) => {
        $crate::__log_at!($manager, Debug, $tag, $($arg)+)
    };
}

/// Logs at Verbose severity.
///
/// # Example
/// ```ignore
/// log_verbose!(manager, "sysex", "{:02X?}", payload);
/// ```
#[macro_export]
macro_rules! log_verbose {
    ($manager:expr, $tag:expr, $($arg:tt)+) => {
        $crate::__log_at!($manager, Verbose, $tag, $($arg)+)
    };
}
