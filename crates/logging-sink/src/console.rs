//! Standard stream destinations.
//!
//! [`ConsoleDestination`] plays the role of the system console log and writes
//! plain lines to standard error. [`TtyDestination`] writes to standard output
//! and colours lines by severity when the stream is a terminal.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use logging::{DestinationKind, LogRecord};

use crate::destination::Destination;
use crate::error::{IoResultExt, SinkError};
use crate::sink::{RecordSink, Style};

/// Writes records to standard error.
#[derive(Debug)]
pub struct ConsoleDestination<W = io::Stderr> {
    sink: RecordSink<W>,
}

impl ConsoleDestination {
    /// Creates a destination bound to the process's standard error.
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl<W: Write + Send> ConsoleDestination<W> {
    /// Creates a console destination over an arbitrary writer.
    pub fn with_writer(writer: W) -> Self {
        Self {
            sink: RecordSink::new(writer),
        }
    }

    /// Consumes the destination and returns the writer.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> Destination for ConsoleDestination<W> {
    fn name(&self) -> &str {
        DestinationKind::Console.name()
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.sink.write(record).for_destination(self.name())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush().for_destination(self.name())
    }
}

/// Writes records to standard output, coloured when attached to a terminal.
#[derive(Debug)]
pub struct TtyDestination<W = io::Stdout> {
    sink: RecordSink<W>,
}

impl TtyDestination {
    /// Creates a destination bound to standard output.
    ///
    /// Colour is enabled only when standard output is a terminal.
    pub fn stdout() -> Self {
        let stdout = io::stdout();
        let color = stdout.is_terminal();
        Self::with_writer(stdout, color)
    }
}

impl<W: Write + Send> TtyDestination<W> {
    /// Creates a terminal destination over an arbitrary writer.
    pub fn with_writer(writer: W, color: bool) -> Self {
        Self {
            sink: RecordSink::new(writer).with_style(Style {
                color,
                location: false,
            }),
        }
    }

    /// Reports whether lines are coloured.
    pub fn colored(&self) -> bool {
        self.sink.style().color
    }

    /// Consumes the destination and returns the writer.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> Destination for TtyDestination<W> {
    fn name(&self) -> &str {
        DestinationKind::Tty.name()
    }

    fn accept(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.sink.write(record).for_destination(self.name())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush().for_destination(self.name())
    }
}
