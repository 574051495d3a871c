//! Drives the exported C functions against an installed bridge.
//!
//! The bridge is process-wide, so the whole session runs in one test.

use std::ffi::CStr;
use std::fs;
use std::sync::Arc;

use bridge::{
    Bridge, install, isLoging, logPath, logPathFree, startLog, stopLog, writeLog, writeLogWide,
};
use logging::{DestinationKind, LogConfig};
use logging_sink::MemoryDestination;
use manager::LogManager;

#[test]
fn c_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(LogManager::new());
    let capture = MemoryDestination::new("capture");
    manager.attach(capture.clone());

    let config = LogConfig::empty()
        .with_destination(DestinationKind::File)
        .with_file_directory(dir.path())
        .with_file_name("bridge.log");
    assert!(install(Bridge::new(Arc::clone(&manager), config.clone())).is_ok());
    assert!(install(Bridge::new(Arc::new(LogManager::new()), config)).is_err());

    // Idle: nothing is recorded and there is no path.
    assert!(!isLoging());
    unsafe { writeLog(c"midi".as_ptr(), c"dropped".as_ptr()) };
    assert!(logPath().is_null());

    assert!(startLog());
    assert!(isLoging());

    unsafe {
        writeLog(c"midi".as_ptr(), c"note on".as_ptr());
        writeLog(std::ptr::null(), c"untagged".as_ptr());
    }
    let tag: Vec<u16> = "clock".encode_utf16().chain([0]).collect();
    let message: Vec<u16> = "tick \u{266A}".encode_utf16().chain([0]).collect();
    unsafe { writeLogWide(tag.as_ptr(), message.as_ptr()) };

    let raw = logPath();
    assert!(!raw.is_null());
    let path = unsafe { CStr::from_ptr(raw) }
        .to_str()
        .unwrap()
        .to_owned();
    unsafe { logPathFree(raw) };
    assert_eq!(path, dir.path().join("bridge.log").to_str().unwrap());

    stopLog();
    assert!(!isLoging());
    assert!(logPath().is_null());

    let messages: Vec<_> = capture
        .records()
        .iter()
        .map(|record| (record.tag().to_owned(), record.message().to_owned()))
        .collect();
    assert_eq!(
        messages,
        [
            ("midi".to_owned(), "note on".to_owned()),
            (String::new(), "untagged".to_owned()),
            ("clock".to_owned(), "tick \u{266A}".to_owned()),
        ]
    );

    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("[I] [midi] note on"));
    assert!(contents.contains("[I] [clock] tick \u{266A}"));
    assert!(!contents.contains("dropped"));
}
