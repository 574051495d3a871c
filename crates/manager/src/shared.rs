//! crates/manager/src/shared.rs
//! State shared between callers and the delivery worker.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use logging::LogRecord;

use crate::error::WriteError;
use crate::registry::Registry;
use crate::stats::Counters;

pub(crate) type FailureObserver = Box<dyn Fn(&WriteError) + Send + Sync>;

pub(crate) struct Shared {
    registry: Mutex<Registry>,
    pub(crate) counters: Counters,
    observer: Option<FailureObserver>,
}

impl Shared {
    pub(crate) fn new(observer: Option<FailureObserver>) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            counters: Counters::default(),
            observer,
        }
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().expect("destination registry mutex poisoned")
    }

    /// Routes a failure to tracing, the counters and the observer.
    ///
    /// Must be called without the registry lock or the manager state lock
    /// held: the observer may log through the manager.
    pub(crate) fn report(&self, failure: &WriteError) {
        tracing::warn!(
            destination = %failure.destination,
            error = %failure.source,
            "log destination failed"
        );
        self.counters.failed();
        if let Some(observer) = &self.observer {
            observer(failure);
        }
    }

    pub(crate) fn report_all(&self, failures: &[WriteError]) {
        for failure in failures {
            self.report(failure);
        }
    }

    /// Forwards `record` and flushes every destination before returning.
    ///
    /// Failures are returned unreported; the caller passes them to
    /// [`report_all`](Self::report_all) once it holds no manager lock.
    pub(crate) fn deliver_now(&self, record: &LogRecord) -> Vec<WriteError> {
        let failures = {
            let mut registry = self.registry();
            let mut report = registry.forward(record);
            report.failures.extend(registry.flush_all());
            report.failures
        };
        self.counters.delivered();
        failures
    }

    /// Forwards `record` without flushing; returns the number of failures.
    pub(crate) fn deliver_deferred(&self, record: &LogRecord) -> usize {
        let failures = self.registry().forward(record).failures;
        self.counters.delivered();
        self.report_all(&failures);
        failures.len()
    }

    pub(crate) fn flush(&self) {
        let failures = self.registry().flush_all();
        self.report_all(&failures);
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("registry", &self.registry)
            .field("counters", &self.counters)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
