//! Append-only file destination.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use logging::{DestinationKind, LogRecord};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::destination::Destination;
use crate::error::{IoResultExt, SinkError};
use crate::sink::{RecordSink, Style};

/// Builds the default log file name, `<prefix>-<YYYY-MM-DD>.log`, for the day of `now`.
pub fn default_file_name(prefix: &str, now: SystemTime) -> String {
    let date = OffsetDateTime::from(now)
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| String::from("undated"));
    format!("{prefix}-{date}.log")
}

/// Writes records to a file opened in append mode.
///
/// Output is buffered; the manager flushes after every synchronous record and
/// whenever the delivery queue runs dry.
#[derive(Debug)]
pub struct FileDestination {
    path: PathBuf,
    sink: RecordSink<BufWriter<File>>,
}

impl FileDestination {
    /// Opens (creating if absent) the file at `path`.
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            sink: RecordSink::new(BufWriter::new(file)).with_style(Style {
                color: false,
                location: true,
            }),
        })
    }

    /// Path of the log file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

impl Destination for FileDestination {
    fn name(&self) -> &str {
        DestinationKind::File.name()
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.sink.write(record).for_destination(self.name())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush().for_destination(self.name())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
