//! crates/manager/src/manager.rs
//! Lifecycle, filtering and dispatch.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use logging::{
    DestinationKind, DispatchPolicy, FlagMask, Location, LogConfig, LogFlag, LogRecord, Severity,
    accepts,
};
use logging_sink::{
    ConsoleDestination, Destination, FileDestination, OsLogDestination, TtyDestination,
    default_file_name,
};

use crate::error::{ConfigurationError, WriteError};
use crate::shared::Shared;
use crate::stats::DispatchStats;
use crate::worker::DeliveryWorker;

/// What happened to a record handed to [`LogManager::log`].
#[derive(Debug)]
pub enum WriteOutcome {
    /// The manager was idle; the record was dropped.
    Inactive,
    /// The threshold or flag mask rejected the record.
    Filtered,
    /// The record was forwarded on the caller's thread.
    Delivered {
        /// Destinations that failed to accept or flush it.
        failures: Vec<WriteError>,
    },
    /// The record was queued for the delivery worker.
    Deferred,
}

impl WriteOutcome {
    /// Reports whether the record was accepted by the filter.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::Deferred)
    }
}

/// Summary of a [`LogManager::stop`] call.
#[derive(Debug, Default)]
pub struct StopReport {
    /// Deferred records delivered by the worker during the session.
    pub deferred: u64,
    /// Destination failures among those deferred deliveries.
    pub deferred_failures: u64,
    /// Failures while flushing and closing destinations.
    pub failures: Vec<WriteError>,
}

impl StopReport {
    /// Reports whether the session closed without any destination failure.
    pub fn is_clean(&self) -> bool {
        self.deferred_failures == 0 && self.failures.is_empty()
    }
}

#[derive(Debug)]
struct State {
    running: bool,
    threshold: Severity,
    flags: FlagMask,
    policy: DispatchPolicy,
    /// Built-in destinations this manager registered.
    builtins: BTreeSet<DestinationKind>,
    file_path: Option<PathBuf>,
    worker: Option<DeliveryWorker>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            running: false,
            threshold: Severity::All,
            flags: FlagMask::ALL,
            policy: DispatchPolicy::default(),
            builtins: BTreeSet::new(),
            file_path: None,
            worker: None,
        }
    }
}

/// Builder for a [`LogManager`].
#[derive(Default)]
pub struct LogManagerBuilder {
    observer: Option<crate::shared::FailureObserver>,
}

impl LogManagerBuilder {
    /// Installs a callback invoked for every destination failure.
    #[must_use]
    pub fn failure_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&WriteError) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Creates the idle manager.
    pub fn build(self) -> LogManager {
        LogManager {
            lifecycle: Mutex::new(()),
            state: RwLock::new(State::default()),
            shared: Arc::new(Shared::new(self.observer)),
        }
    }
}

/// Process-level log facility with an `Idle`/`Running` lifecycle.
///
/// `LogManager` is `Send + Sync`; share it by reference or through an
/// [`Arc`]. Writes hold the configuration read lock while filtering and
/// dispatching, so a write observes one consistent configuration.
/// [`start`](Self::start) and [`stop`](Self::stop) are serialised by a
/// separate lifecycle mutex and take the write lock only to swap state, never
/// while waiting on the delivery thread. A failure observer may therefore log
/// through the manager it observes; records it writes once `stop` has begun
/// are dropped as [`WriteOutcome::Inactive`].
///
/// # Examples
///
/// ```
/// use logging::{LogConfig, Severity};
/// use logging_sink::MemoryDestination;
/// use manager::{LogManager, WriteOutcome};
///
/// let manager = LogManager::new();
/// let capture = MemoryDestination::new("capture");
/// manager.attach(capture.clone());
///
/// manager.start(LogConfig::empty())?;
/// manager.write("midi", "device opened");
/// let report = manager.stop();
///
/// assert!(report.is_clean());
/// assert_eq!(capture.records()[0].message(), "device opened");
/// assert!(matches!(manager.write("midi", "late"), WriteOutcome::Inactive));
/// # Ok::<(), manager::ConfigurationError>(())
/// ```
#[derive(Debug)]
pub struct LogManager {
    lifecycle: Mutex<()>,
    state: RwLock<State>,
    shared: Arc<Shared>,
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LogManager {
    /// Creates an idle manager with no destinations.
    pub fn new() -> Self {
        LogManagerBuilder::default().build()
    }

    /// Starts building a manager with non-default hooks.
    pub fn builder() -> LogManagerBuilder {
        LogManagerBuilder::default()
    }

    /// Creates an idle manager that reports destination failures to
    /// `observer`.
    pub fn with_failure_observer<F>(observer: F) -> Self
    where
        F: Fn(&WriteError) + Send + Sync + 'static,
    {
        Self::builder().failure_observer(observer).build()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().expect("log manager state lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().expect("log manager state lock poisoned")
    }

    fn lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().expect("log manager lifecycle mutex poisoned")
    }

    /// Reports whether the manager is running.
    pub fn is_active(&self) -> bool {
        self.read_state().running
    }

    /// Applies `config` and enters the running state.
    ///
    /// Every destination `config` needs is built before anything changes, so
    /// an error leaves the manager exactly as it was. Calling `start` while
    /// running re-applies the filter and dispatch settings, keeps destinations
    /// that are still enabled, removes built-ins that are no longer enabled and
    /// reopens the file only when its path changes.
    pub fn start(&self, config: LogConfig) -> Result<(), ConfigurationError> {
        let _lifecycle = self.lifecycle();

        // Only start and stop change these, and both hold the lifecycle mutex.
        let (mut builtins, current_file) = {
            let state = self.read_state();
            (state.builtins.clone(), state.file_path.clone())
        };

        let file_path = if config.has_destination(DestinationKind::File) {
            Some(resolve_file_path(&config)?)
        } else {
            None
        };

        let mut fresh: Vec<(DestinationKind, Box<dyn Destination>)> = Vec::new();
        for &kind in &config.destinations {
            let present = builtins.contains(&kind)
                && (kind != DestinationKind::File || current_file == file_path);
            if !present {
                fresh.push((kind, build_destination(kind, &config, file_path.as_deref())?));
            }
        }

        let queue = {
            let mut state = self.write_state();
            let worker = match state.worker.take() {
                Some(worker) => worker,
                None => DeliveryWorker::spawn(Arc::clone(&self.shared))
                    .map_err(ConfigurationError::SpawnWorker)?,
            };
            let queue = worker.queue().clone();
            state.worker = Some(worker);
            queue
        };

        // Queued records belong to the previous destination set.
        queue.barrier();

        let mut failures = Vec::new();
        {
            let mut registry = self.shared.registry();
            let replaced: Vec<DestinationKind> = fresh.iter().map(|(kind, _)| *kind).collect();
            let retired: Vec<DestinationKind> = builtins
                .iter()
                .copied()
                .filter(|kind| !config.has_destination(*kind) || replaced.contains(kind))
                .collect();

            for kind in retired {
                builtins.remove(&kind);
                if let Some(mut destination) = registry.unregister(kind.name()) {
                    if let Err(source) = destination.flush() {
                        failures.push(WriteError::new(kind.name(), source));
                    }
                }
            }

            for (kind, destination) in fresh {
                if registry.register(destination) {
                    builtins.insert(kind);
                } else {
                    tracing::debug!(
                        destination = kind.name(),
                        "name already taken by an attached destination"
                    );
                }
            }
        }
        self.shared.report_all(&failures);

        let mut state = self.write_state();
        state.file_path = if builtins.contains(&DestinationKind::File) {
            file_path
        } else {
            None
        };
        state.builtins = builtins;
        state.threshold = config.threshold;
        state.flags = config.flags;
        state.policy = config.policy;

        if !state.running {
            state.running = true;
            tracing::debug!(
                threshold = %state.threshold,
                flags = %state.flags,
                file = ?state.file_path,
                "log manager started"
            );
        } else {
            tracing::debug!(threshold = %state.threshold, "log manager reconfigured");
        }
        Ok(())
    }

    /// Stops the manager, delivering every queued record first.
    ///
    /// Destinations are flushed and unregistered; failures are collected in
    /// the report. Does nothing while idle.
    pub fn stop(&self) -> StopReport {
        let _lifecycle = self.lifecycle();

        let worker = {
            let mut state = self.write_state();
            if !state.running {
                return StopReport::default();
            }
            state.running = false;
            state.builtins.clear();
            state.file_path = None;
            state.worker.take()
        };

        let mut report = StopReport::default();
        if let Some(worker) = worker {
            let summary = worker.shutdown();
            report.deferred = summary.delivered;
            report.deferred_failures = summary.failed;
        }

        report.failures = self.shared.registry().drain();
        self.shared.report_all(&report.failures);

        tracing::debug!(
            deferred = report.deferred,
            failures = report.failures.len(),
            "log manager stopped"
        );
        report
    }

    /// Logs `message` under `tag` at Info severity with the Info flag.
    #[track_caller]
    pub fn write(&self, tag: impl Into<String>, message: impl Into<String>) -> WriteOutcome {
        self.log(LogRecord::new(tag, message).with_location(Location::caller()))
    }

    /// Logs `message` under `tag` with an explicit severity and flag.
    #[track_caller]
    pub fn write_with(
        &self,
        tag: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        flag: LogFlag,
    ) -> WriteOutcome {
        self.log(
            LogRecord::new(tag, message)
                .with_severity(severity)
                .with_flag(flag)
                .with_location(Location::caller()),
        )
    }

    /// Filters `record`, then delivers it inline or queues it per the
    /// dispatch policy.
    pub fn log(&self, record: LogRecord) -> WriteOutcome {
        let state = self.read_state();
        if !state.running {
            self.shared.counters.inactive();
            return WriteOutcome::Inactive;
        }
        if !accepts(record.severity(), record.flag(), state.threshold, state.flags) {
            self.shared.counters.filtered();
            return WriteOutcome::Filtered;
        }
        self.shared.counters.accepted();

        let worker = if state.policy.is_synchronous(record.severity()) {
            None
        } else {
            state.worker.as_ref()
        };
        let record = match worker {
            None => record,
            Some(worker) => match worker.queue().send(record) {
                Ok(()) => return WriteOutcome::Deferred,
                Err(record) => {
                    tracing::warn!("delivery worker is gone, delivering inline");
                    record
                }
            },
        };

        let failures = self.shared.deliver_now(&record);
        drop(state);
        self.shared.report_all(&failures);
        WriteOutcome::Delivered { failures }
    }

    /// Registers a caller-supplied destination.
    ///
    /// Returns `false` when the name is taken. Attached destinations stay
    /// registered across `start` and are removed by `stop`.
    pub fn attach<D>(&self, destination: D) -> bool
    where
        D: Destination + 'static,
    {
        self.shared.registry().register(Box::new(destination))
    }

    /// Path of the active log file, if a file destination is registered.
    pub fn current_file_path(&self) -> Option<PathBuf> {
        let state = self.read_state();
        if !state.running {
            return None;
        }
        self.shared.registry().file_path()
    }

    /// Replaces the severity threshold.
    pub fn set_threshold(&self, threshold: Severity) {
        self.write_state().threshold = threshold;
    }

    /// Replaces the enabled flag mask.
    pub fn set_flags(&self, flags: FlagMask) {
        self.write_state().flags = flags;
    }

    /// Current severity threshold.
    pub fn threshold(&self) -> Severity {
        self.read_state().threshold
    }

    /// Current flag mask.
    pub fn flags(&self) -> FlagMask {
        self.read_state().flags
    }

    /// Current dispatch policy.
    pub fn policy(&self) -> DispatchPolicy {
        self.read_state().policy
    }

    /// Names of the registered destinations, in registration order.
    pub fn destinations(&self) -> Vec<String> {
        self.shared
            .registry()
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Snapshot of the dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        self.shared.counters.snapshot()
    }
}

impl Drop for LogManager {
    fn drop(&mut self) {
        let running = self.state.get_mut().is_ok_and(|state| state.running);
        if running {
            self.stop();
        }
    }
}

/// Resolves `<directory>/<file name>`, creating the directory when missing.
fn resolve_file_path(config: &LogConfig) -> Result<PathBuf, ConfigurationError> {
    let directory = config
        .file_directory()
        .ok_or(ConfigurationError::MissingFileDirectory)?;

    match fs::metadata(directory) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            return Err(ConfigurationError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(directory).map_err(|source| {
                ConfigurationError::CreateDirectory {
                    path: directory.to_path_buf(),
                    source,
                }
            })?;
        }
        Err(source) => {
            return Err(ConfigurationError::CreateDirectory {
                path: directory.to_path_buf(),
                source,
            });
        }
    }

    let name = config
        .file_name
        .clone()
        .unwrap_or_else(|| default_file_name(&config.tag, SystemTime::now()));
    Ok(directory.join(name))
}

fn build_destination(
    kind: DestinationKind,
    config: &LogConfig,
    file_path: Option<&Path>,
) -> Result<Box<dyn Destination>, ConfigurationError> {
    Ok(match kind {
        DestinationKind::Console => Box::new(ConsoleDestination::stderr()),
        DestinationKind::Tty => Box::new(TtyDestination::stdout()),
        DestinationKind::Os => Box::new(
            OsLogDestination::open(&config.tag, config.facility)
                .map_err(ConfigurationError::OsLogUnavailable)?,
        ),
        DestinationKind::File => {
            let path = file_path.ok_or(ConfigurationError::MissingFileDirectory)?;
            Box::new(FileDestination::open(path).map_err(|source| {
                ConfigurationError::OpenFile {
                    path: path.to_path_buf(),
                    source,
                }
            })?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging_sink::MemoryDestination;

    fn running_with_capture(config: LogConfig) -> (LogManager, MemoryDestination) {
        let manager = LogManager::new();
        let capture = MemoryDestination::new("capture");
        assert!(manager.attach(capture.clone()));
        manager.start(config).unwrap();
        (manager, capture)
    }

    #[test]
    fn idle_manager_drops_writes() {
        let manager = LogManager::new();
        assert!(matches!(manager.write("t", "m"), WriteOutcome::Inactive));
        assert_eq!(manager.stats().inactive, 1);
        assert!(manager.current_file_path().is_none());
    }

    #[test]
    fn error_is_delivered_inline_by_default() {
        let (manager, capture) = running_with_capture(LogConfig::empty());
        let outcome = manager.write_with("t", "boom", Severity::Error, LogFlag::Error);
        assert!(matches!(outcome, WriteOutcome::Delivered { ref failures } if failures.is_empty()));
        assert_eq!(capture.len(), 1);
        manager.stop();
    }

    #[test]
    fn info_is_deferred_by_default() {
        let (manager, capture) = running_with_capture(LogConfig::empty());
        assert!(matches!(manager.write("t", "later"), WriteOutcome::Deferred));
        let report = manager.stop();
        assert_eq!(report.deferred, 1);
        assert_eq!(capture.len(), 1);
    }

    #[test]
    fn kill_switch_forces_inline_delivery() {
        let mut config = LogConfig::empty();
        config.policy.asynchronous = false;
        let (manager, capture) = running_with_capture(config);
        assert!(matches!(
            manager.write("t", "now"),
            WriteOutcome::Delivered { .. }
        ));
        assert_eq!(capture.len(), 1);
        manager.stop();
    }

    #[test]
    fn threshold_filters_higher_severities() {
        let (manager, capture) =
            running_with_capture(LogConfig::empty().with_threshold(Severity::Warning));
        assert!(matches!(manager.write("t", "info"), WriteOutcome::Filtered));
        assert!(manager
            .write_with("t", "warn", Severity::Warning, LogFlag::Warning)
            .is_accepted());
        manager.stop();
        assert_eq!(capture.len(), 1);
        assert_eq!(manager.stats().filtered, 1);
    }

    #[test]
    fn runtime_threshold_change_applies_immediately() {
        let (manager, _capture) = running_with_capture(LogConfig::empty());
        manager.set_threshold(Severity::Off);
        assert!(matches!(
            manager.write_with("t", "e", Severity::Error, LogFlag::Error),
            WriteOutcome::Filtered
        ));
        assert_eq!(manager.threshold(), Severity::Off);
        manager.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let (manager, _capture) = running_with_capture(LogConfig::empty());
        manager.stop();
        let second = manager.stop();
        assert!(second.is_clean());
        assert_eq!(second.deferred, 0);
        assert!(!manager.is_active());
    }

    #[test]
    fn stop_unregisters_attached_destinations() {
        let (manager, _capture) = running_with_capture(LogConfig::empty());
        assert_eq!(manager.destinations(), ["capture"]);
        manager.stop();
        assert!(manager.destinations().is_empty());
    }

    #[test]
    fn file_destination_requires_directory() {
        let manager = LogManager::new();
        let mut config = LogConfig::empty().with_destination(DestinationKind::File);
        config.file_directory = None;
        assert!(matches!(
            manager.start(config),
            Err(ConfigurationError::MissingFileDirectory)
        ));
        assert!(!manager.is_active());
    }

    #[test]
    fn file_as_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain-file");
        fs::write(&blocker, b"").unwrap();

        let manager = LogManager::new();
        let config = LogConfig::empty()
            .with_destination(DestinationKind::File)
            .with_file_directory(&blocker);
        assert!(matches!(
            manager.start(config),
            Err(ConfigurationError::NotADirectory { .. })
        ));
    }

    #[test]
    fn failed_restart_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LogManager::new();
        let good = LogConfig::empty()
            .with_destination(DestinationKind::File)
            .with_file_directory(dir.path())
            .with_threshold(Severity::Debug);
        manager.start(good).unwrap();
        let path = manager.current_file_path();

        let mut bad = LogConfig::empty()
            .with_destination(DestinationKind::File)
            .with_threshold(Severity::Error);
        bad.file_directory = None;
        assert!(manager.start(bad).is_err());

        assert!(manager.is_active());
        assert_eq!(manager.threshold(), Severity::Debug);
        assert_eq!(manager.current_file_path(), path);
        manager.stop();
    }

    #[test]
    fn restart_without_file_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LogManager::new();
        manager
            .start(
                LogConfig::empty()
                    .with_destination(DestinationKind::File)
                    .with_file_directory(dir.path()),
            )
            .unwrap();
        assert!(manager.current_file_path().is_some());

        manager.start(LogConfig::empty()).unwrap();
        assert!(manager.current_file_path().is_none());
        assert!(manager.destinations().is_empty());
        manager.stop();
    }
}
