//! Lifecycle and delivery scenarios for `LogManager`.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak, mpsc};
use std::thread;
use std::time::Duration;

use logging::{
    DestinationKind, DispatchMode, DispatchPolicy, FlagMask, LogConfig, LogFlag, LogRecord,
    Severity,
};
use logging_sink::{Destination, MemoryDestination, SinkError};
use manager::{LogManager, WriteOutcome};

fn file_config(dir: &std::path::Path) -> LogConfig {
    LogConfig::empty()
        .with_destination(DestinationKind::File)
        .with_file_directory(dir)
}

/// Destination that refuses every record.
struct Broken;

impl Destination for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn accept(&mut self, _record: &LogRecord) -> Result<(), SinkError> {
        Err(SinkError::Closed("broken".into()))
    }
}

/// Destination that holds its first `midi` record until released, then
/// refuses it. Records tagged `status` are accepted.
struct Gate {
    release: mpsc::Receiver<()>,
}

impl Destination for Gate {
    fn name(&self) -> &str {
        "gate"
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        if record.tag() == "status" {
            return Ok(());
        }
        let _ = self.release.recv();
        Err(SinkError::Closed("gate".into()))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Writing before start has no observable effect.
#[test]
fn write_before_start_is_dropped() {
    let manager = LogManager::new();
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());

    assert!(matches!(
        manager.write("net", "too early"),
        WriteOutcome::Inactive
    ));
    manager.start(LogConfig::empty()).unwrap();
    manager.stop();

    assert!(capture.is_empty());
    assert_eq!(manager.stats().accepted, 0);
}

/// Start then stop leaves the manager idle without a file path.
#[test]
fn start_stop_returns_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LogManager::new();
    manager.start(file_config(dir.path())).unwrap();
    assert!(manager.is_active());
    assert!(manager.current_file_path().is_some());

    manager.stop();
    assert!(!manager.is_active());
    assert!(manager.current_file_path().is_none());
}

/// The lifecycle can be repeated.
#[test]
fn lifecycle_is_repeatable() {
    let manager = LogManager::new();
    for _ in 0..3 {
        manager.start(LogConfig::empty()).unwrap();
        assert!(manager.is_active());
        manager.stop();
        assert!(!manager.is_active());
    }
}

/// A second start keeps one file destination and one path.
#[test]
fn double_start_keeps_single_file_destination() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LogManager::new();
    manager.start(file_config(dir.path())).unwrap();
    let first = manager.current_file_path();
    manager.start(file_config(dir.path())).unwrap();

    assert_eq!(manager.current_file_path(), first);
    assert_eq!(manager.destinations(), ["file"]);

    manager.write_with("net", "once", Severity::Error, LogFlag::Error);
    let path = first.unwrap();
    manager.stop();
    let contents = fs::read_to_string(path).unwrap();
    assert_eq!(contents.matches("once").count(), 1);
}

/// Restarting with another file name reopens the file.
#[test]
fn restart_with_new_file_name_switches_file() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LogManager::new();
    manager
        .start(file_config(dir.path()).with_file_name("a.log"))
        .unwrap();
    manager.write("t", "into a");
    manager
        .start(file_config(dir.path()).with_file_name("b.log"))
        .unwrap();
    manager.write("t", "into b");
    assert_eq!(manager.current_file_path(), Some(dir.path().join("b.log")));
    manager.stop();

    let a = fs::read_to_string(dir.path().join("a.log")).unwrap();
    let b = fs::read_to_string(dir.path().join("b.log")).unwrap();
    assert!(a.contains("into a") && !a.contains("into b"));
    assert!(b.contains("into b") && !b.contains("into a"));
}

// ============================================================================
// File destination
// ============================================================================

/// The log file lives in the configured directory and holds the message
/// once the manager has stopped.
#[test]
fn file_scenario_writes_message() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LogManager::new();
    manager.start(file_config(dir.path())).unwrap();

    let path = manager.current_file_path().unwrap();
    assert_eq!(path.parent(), Some(dir.path()));

    manager.write("net", "connected");
    manager.stop();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("connected"));
    assert!(contents.contains("[I] [net] connected"));
}

/// Missing directories are created.
#[test]
fn missing_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let manager = LogManager::new();
    manager.start(file_config(&nested)).unwrap();
    assert!(nested.is_dir());
    manager.stop();
}

/// The default file name is dated and prefixed with the tag.
#[test]
fn default_file_name_uses_tag() {
    let dir = tempfile::tempdir().unwrap();
    let manager = LogManager::new();
    manager.start(file_config(dir.path())).unwrap();
    let path = manager.current_file_path().unwrap();
    manager.stop();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("midilog-"));
    assert!(name.ends_with(".log"));
}

// ============================================================================
// Filtering and dispatch
// ============================================================================

/// Records whose flag is masked out never reach a destination.
#[test]
fn masked_flags_are_filtered() {
    let manager = LogManager::new();
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());
    manager
        .start(LogConfig::empty().with_flags(FlagMask::from(LogFlag::Error)))
        .unwrap();

    assert!(matches!(manager.write("t", "info"), WriteOutcome::Filtered));
    assert!(
        manager
            .write_with("t", "err", Severity::Error, LogFlag::Error)
            .is_accepted()
    );
    manager.stop();

    assert_eq!(capture.len(), 1);
}

/// Every deferred write is delivered before stop returns.
#[test]
fn stop_drains_deferred_writes() {
    let manager = LogManager::new();
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());
    manager.start(LogConfig::empty()).unwrap();

    for index in 0..200 {
        assert!(matches!(
            manager.write_with("t", index.to_string(), Severity::Debug, LogFlag::Debug),
            WriteOutcome::Deferred
        ));
    }
    let report = manager.stop();

    assert_eq!(report.deferred, 200);
    assert_eq!(capture.len(), 200);
}

/// Ten threads writing a hundred deferred Debug records each produce exactly
/// a thousand intact records.
#[test]
fn concurrent_deferred_writes_are_all_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(LogManager::new());
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());
    manager
        .start(file_config(dir.path()).with_threshold(Severity::Debug))
        .unwrap();
    let path = manager.current_file_path().unwrap();

    let handles: Vec<_> = (0..10)
        .map(|thread_index| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for index in 0..100 {
                    let outcome = manager.write_with(
                        format!("worker{thread_index}"),
                        format!("message {thread_index}-{index}"),
                        Severity::Debug,
                        LogFlag::Debug,
                    );
                    assert!(matches!(outcome, WriteOutcome::Deferred));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    manager.stop();

    assert_eq!(capture.len(), 1000);
    let contents = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 1000);
    for line in lines {
        assert!(line.contains("[D] [worker"), "mangled line: {line}");
        assert!(line.contains("] message "), "mangled line: {line}");
    }

    // Per-thread order is preserved.
    let records = capture.records();
    for thread_index in 0..10 {
        let tag = format!("worker{thread_index}");
        let sequence: Vec<u32> = records
            .iter()
            .filter(|record| record.tag() == tag)
            .map(|record| {
                record
                    .message()
                    .rsplit('-')
                    .next()
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect();
        assert_eq!(sequence, (0..100).collect::<Vec<_>>());
    }
}

/// A custom policy can make Info synchronous.
#[test]
fn policy_table_is_applied_at_start() {
    let mut policy = DispatchPolicy::default();
    policy.set(LogFlag::Info, DispatchMode::Synchronous);

    let manager = LogManager::new();
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());
    manager
        .start(LogConfig::empty().with_policy(policy))
        .unwrap();

    assert!(matches!(
        manager.write("t", "now"),
        WriteOutcome::Delivered { .. }
    ));
    assert_eq!(capture.len(), 1);
    assert_eq!(manager.policy(), policy);
    manager.stop();
}

// ============================================================================
// Failures
// ============================================================================

/// A failing destination does not keep a healthy one from receiving every
/// record, and each failure is observed.
#[test]
fn failing_destination_does_not_block_healthy_one() {
    let observed = Arc::new(AtomicUsize::new(0));
    let names = Arc::new(Mutex::new(Vec::new()));
    let manager = {
        let observed = Arc::clone(&observed);
        let names = Arc::clone(&names);
        LogManager::with_failure_observer(move |failure| {
            observed.fetch_add(1, Ordering::SeqCst);
            names.lock().unwrap().push(failure.destination.clone());
        })
    };
    let healthy = MemoryDestination::new("healthy");
    assert!(manager.attach(Broken));
    assert!(manager.attach(healthy.clone()));
    manager.start(LogConfig::empty()).unwrap();

    let outcome = manager.write_with("t", "sync", Severity::Error, LogFlag::Error);
    match outcome {
        WriteOutcome::Delivered { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].destination, "broken");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    for index in 0..10 {
        manager.write("t", format!("deferred {index}"));
    }
    let report = manager.stop();

    assert_eq!(healthy.len(), 11);
    assert_eq!(report.deferred_failures, 10);
    assert!(!report.is_clean());
    assert_eq!(observed.load(Ordering::SeqCst), 11);
    assert!(names.lock().unwrap().iter().all(|name| name == "broken"));
    assert_eq!(manager.stats().failed, 11);
}

/// Attaching a second destination with a taken name is refused.
#[test]
fn duplicate_attach_is_refused() {
    let manager = LogManager::new();
    assert!(manager.attach(MemoryDestination::new("capture")));
    assert!(!manager.attach(MemoryDestination::new("capture")));
    assert_eq!(manager.destinations(), ["capture"]);
}

/// An observer that logs through the manager does not hold up `stop`, even
/// when the failure is reported while `stop` is draining the queue.
#[test]
fn observer_may_log_through_manager_during_stop() {
    let manager = Arc::new_cyclic(|weak: &Weak<LogManager>| {
        let weak = weak.clone();
        LogManager::with_failure_observer(move |failure| {
            if let Some(manager) = weak.upgrade() {
                manager.write("status", format!("{} failed", failure.destination));
            }
        })
    });
    let (release_tx, release_rx) = mpsc::channel();
    let healthy = MemoryDestination::new("healthy");
    assert!(manager.attach(Gate {
        release: release_rx,
    }));
    assert!(manager.attach(healthy.clone()));
    manager.start(LogConfig::empty()).unwrap();

    assert!(matches!(
        manager.write("midi", "note on"),
        WriteOutcome::Deferred
    ));

    let (done_tx, done_rx) = mpsc::channel();
    let stopper = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            let report = manager.stop();
            let _ = done_tx.send(report.deferred_failures);
        })
    };
    while manager.is_active() {
        thread::yield_now();
    }
    release_tx.send(()).unwrap();

    let deferred_failures = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("stop returned while the observer was logging");
    stopper.join().unwrap();

    assert_eq!(deferred_failures, 1);
    assert!(!manager.is_active());
    let messages: Vec<_> = healthy
        .records()
        .iter()
        .map(|record| record.message().to_owned())
        .collect();
    assert_eq!(messages, ["note on"]);
    assert_eq!(manager.stats().inactive, 1);
}

/// An observer invoked by an inline delivery can log through the manager.
#[test]
fn observer_may_log_through_manager_during_inline_delivery() {
    let reported = Arc::new(AtomicBool::new(false));
    let manager = Arc::new_cyclic(|weak: &Weak<LogManager>| {
        let weak = weak.clone();
        let reported = Arc::clone(&reported);
        LogManager::with_failure_observer(move |failure| {
            if reported.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(manager) = weak.upgrade() {
                manager.write("status", format!("{} failed", failure.destination));
            }
        })
    });
    let healthy = MemoryDestination::new("healthy");
    assert!(manager.attach(Broken));
    assert!(manager.attach(healthy.clone()));
    manager.start(LogConfig::empty()).unwrap();

    let outcome = manager.write_with("midi", "overrun", Severity::Error, LogFlag::Error);
    assert!(matches!(outcome, WriteOutcome::Delivered { ref failures } if failures.len() == 1));
    manager.stop();

    let messages: Vec<_> = healthy
        .records()
        .iter()
        .map(|record| (record.tag().to_owned(), record.message().to_owned()))
        .collect();
    assert_eq!(
        messages,
        [
            ("midi".to_owned(), "overrun".to_owned()),
            ("status".to_owned(), "broken failed".to_owned()),
        ]
    );
}
