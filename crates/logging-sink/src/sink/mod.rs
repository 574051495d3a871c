use std::fmt;

use time::UtcOffset;

mod writing;

pub(crate) use writing::sanitize_tag;

/// Presentation options applied by a [`RecordSink`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Style {
    /// Wrap each line in an ANSI colour chosen by severity.
    pub color: bool,
    /// Append `(file:line)` when the record carries a location.
    pub location: bool,
}

/// Streaming sink that renders [`LogRecord`](logging::LogRecord) values into an
/// [`std::io::Write`] target.
///
/// Each record becomes one line of the form
/// `2026-10-17 09:41:02.117 [I] [net] connected`. The line is assembled in a
/// reusable scratch buffer and handed to the writer with a single
/// `write_all`, so concurrent sinks sharing a file descriptor never interleave
/// partial lines.
///
/// # Examples
///
/// ```
/// use logging::{LogRecord, Severity};
/// use logging_sink::RecordSink;
///
/// let mut sink = RecordSink::new(Vec::new());
/// sink.write(&LogRecord::new("net", "connected"))?;
/// sink.write(&LogRecord::new("net", "lost carrier").with_level(Severity::Warning))?;
///
/// let output = String::from_utf8(sink.into_inner()).unwrap();
/// let mut lines = output.lines();
/// assert!(lines.next().unwrap().ends_with("[I] [net] connected"));
/// assert!(lines.next().unwrap().ends_with("[W] [net] lost carrier"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RecordSink<W> {
    writer: W,
    scratch: Vec<u8>,
    style: Style,
    offset: UtcOffset,
}

impl<W> RecordSink<W> {
    /// Creates a plain sink stamped in the local offset.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            scratch: Vec::with_capacity(256),
            style: Style::default(),
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    /// Replaces the presentation style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Forces timestamps into `offset` instead of the local offset.
    #[must_use]
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the presentation style.
    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Consumes the sink and returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> fmt::Debug for RecordSink<W>
where
    W: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSink")
            .field("writer", &self.writer)
            .field("style", &self.style)
            .finish()
    }
}
