//! crates/logging/src/policy.rs
//! Per-severity choice between inline and deferred delivery.

use super::levels::{LogFlag, Severity};

/// How an accepted record reaches its destinations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DispatchMode {
    /// Forwarded on the calling thread; `write` returns after destination I/O.
    Synchronous,
    /// Enqueued for the delivery worker; `write` returns after the enqueue.
    Deferred,
}

/// Table mapping each severity to a [`DispatchMode`].
///
/// The default sends errors synchronously so they reach durable storage before
/// the caller proceeds, and defers everything else.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchPolicy {
    /// When false every record is delivered synchronously.
    pub asynchronous: bool,
    /// Mode for error records.
    pub error: DispatchMode,
    /// Mode for warning records.
    pub warning: DispatchMode,
    /// Mode for info records.
    pub info: DispatchMode,
    /// Mode for debug records.
    pub debug: DispatchMode,
    /// Mode for verbose records.
    pub verbose: DispatchMode,
}

impl DispatchPolicy {
    /// Policy delivering every severity inline.
    pub const fn all_synchronous() -> Self {
        Self::uniform(DispatchMode::Synchronous)
    }

    /// Policy deferring every severity, errors included.
    pub const fn all_deferred() -> Self {
        Self::uniform(DispatchMode::Deferred)
    }

    const fn uniform(mode: DispatchMode) -> Self {
        Self {
            asynchronous: true,
            error: mode,
            warning: mode,
            info: mode,
            debug: mode,
            verbose: mode,
        }
    }

    /// Returns the mode configured for `flag`.
    pub const fn get(&self, flag: LogFlag) -> DispatchMode {
        match flag {
            LogFlag::Error => self.error,
            LogFlag::Warning => self.warning,
            LogFlag::Info => self.info,
            LogFlag::Debug => self.debug,
            LogFlag::Verbose => self.verbose,
        }
    }

    /// Sets the mode for `flag`.
    pub fn set(&mut self, flag: LogFlag, mode: DispatchMode) {
        match flag {
            LogFlag::Error => self.error = mode,
            LogFlag::Warning => self.warning = mode,
            LogFlag::Info => self.info = mode,
            LogFlag::Debug => self.debug = mode,
            LogFlag::Verbose => self.verbose = mode,
        }
    }

    /// Returns the effective mode for a record of `severity`.
    ///
    /// `Off` shares the error entry and `All` the verbose entry.
    pub const fn mode(&self, severity: Severity) -> DispatchMode {
        if !self.asynchronous {
            return DispatchMode::Synchronous;
        }
        let flag = match severity {
            Severity::Off | Severity::Error => LogFlag::Error,
            Severity::Warning => LogFlag::Warning,
            Severity::Info => LogFlag::Info,
            Severity::Debug => LogFlag::Debug,
            Severity::Verbose | Severity::All => LogFlag::Verbose,
        };
        self.get(flag)
    }

    /// Reports whether a record of `severity` is delivered inline.
    pub const fn is_synchronous(&self, severity: Severity) -> bool {
        matches!(self.mode(severity), DispatchMode::Synchronous)
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            error: DispatchMode::Synchronous,
            ..Self::all_deferred()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_blocks_only_on_errors() {
        let policy = DispatchPolicy::default();
        assert!(policy.is_synchronous(Severity::Error));
        assert!(!policy.is_synchronous(Severity::Warning));
        assert!(!policy.is_synchronous(Severity::Info));
        assert!(!policy.is_synchronous(Severity::Debug));
        assert!(!policy.is_synchronous(Severity::Verbose));
    }

    #[test]
    fn threshold_only_severities_follow_neighbours() {
        let policy = DispatchPolicy::default();
        assert!(policy.is_synchronous(Severity::Off));
        assert!(!policy.is_synchronous(Severity::All));
    }

    #[test]
    fn disabling_asynchronous_forces_inline_delivery() {
        let policy = DispatchPolicy {
            asynchronous: false,
            ..DispatchPolicy::all_deferred()
        };
        for severity in Severity::ALL {
            assert!(policy.is_synchronous(severity));
        }
    }

    #[test]
    fn set_overrides_single_entry() {
        let mut policy = DispatchPolicy::default();
        policy.set(LogFlag::Debug, DispatchMode::Synchronous);
        assert_eq!(policy.get(LogFlag::Debug), DispatchMode::Synchronous);
        assert_eq!(policy.get(LogFlag::Info), DispatchMode::Deferred);
    }

    #[test]
    fn uniform_constructors() {
        for severity in Severity::ALL {
            assert!(DispatchPolicy::all_synchronous().is_synchronous(severity));
            assert!(!DispatchPolicy::all_deferred().is_synchronous(severity));
        }
    }
}
