//! crates/bridge/src/ffi.rs
//! C-compatible entry points.
//!
//! Every function acts on the process-wide bridge returned by
//! [`global`](crate::global). Text arguments are NUL-terminated; a null pointer
//! is read as empty text. The declarations live in
//! `include/midilog_bridge.h`.

#![allow(unsafe_code)]
#![allow(non_snake_case)]

use std::ffi::{CStr, CString, c_char};
use std::path::Path;
use std::ptr;

use crate::global;

/// Reports whether the log manager is running.
#[unsafe(no_mangle)]
pub extern "C" fn isLoging() -> bool {
    global().is_logging()
}

/// Starts the log manager; returns `false` if the configuration is refused.
#[unsafe(no_mangle)]
pub extern "C" fn startLog() -> bool {
    global().start()
}

/// Logs a UTF-8 message under `tag`.
///
/// # Safety
///
/// `tag` and `log` must each be null or point to a NUL-terminated string that
/// stays valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn writeLog(tag: *const c_char, log: *const c_char) {
    // SAFETY: forwarded caller contract.
    let (tag, log) = unsafe { (narrow(tag), narrow(log)) };
    global().write_log(tag, log);
}

/// Logs a UTF-16 message under `tag`.
///
/// # Safety
///
/// `tag` and `log` must each be null or point to a sequence of `u16` code
/// units terminated by a zero unit that stays valid for the duration of the
/// call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn writeLogWide(tag: *const u16, log: *const u16) {
    // SAFETY: forwarded caller contract.
    let (tag, log) = unsafe { (wide(tag), wide(log)) };
    global().write_log_wide(tag, log);
}

/// Stops the log manager after delivering pending records.
#[unsafe(no_mangle)]
pub extern "C" fn stopLog() {
    let report = global().stop();
    if !report.is_clean() {
        tracing::warn!(
            failures = report.failures.len(),
            deferred_failures = report.deferred_failures,
            "stopLog completed with destination failures"
        );
    }
}

/// Returns the active log file path as a newly allocated UTF-8 string, or
/// null when no file destination is active.
///
/// Release the string with [`logPathFree`].
#[unsafe(no_mangle)]
pub extern "C" fn logPath() -> *mut c_char {
    global()
        .log_path()
        .and_then(|path| path_to_c_string(&path))
        .map_or(ptr::null_mut(), CString::into_raw)
}

/// Releases a string returned by [`logPath`].
///
/// # Safety
///
/// `path` must be null or a pointer obtained from [`logPath`] that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn logPathFree(path: *mut c_char) {
    if !path.is_null() {
        // SAFETY: the pointer came from `CString::into_raw` in `logPath`.
        drop(unsafe { CString::from_raw(path) });
    }
}

fn path_to_c_string(path: &Path) -> Option<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();

    CString::new(bytes).ok()
}

/// Borrows a NUL-terminated narrow string; null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or valid up to and including its NUL terminator.
unsafe fn narrow<'a>(ptr: *const c_char) -> &'a [u8] {
    if ptr.is_null() {
        return &[];
    }
    // SAFETY: guaranteed by the caller.
    unsafe { CStr::from_ptr(ptr) }.to_bytes()
}

/// Borrows a zero-terminated UTF-16 string; null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or valid up to and including its zero terminator.
unsafe fn wide<'a>(ptr: *const u16) -> &'a [u16] {
    if ptr.is_null() {
        return &[];
    }
    let mut len = 0;
    // SAFETY: every unit up to the terminator is readable per the contract.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: `len` units starting at `ptr` were just read.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
