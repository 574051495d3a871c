use std::borrow::{Borrow, Cow};
use std::io::{self, Write};

use logging::{LogRecord, Severity};
use time::OffsetDateTime;
use time::macros::format_description;

use super::RecordSink;

const RESET: &str = "\x1b[0m";

/// ANSI colour prefix for a severity; `None` keeps the terminal default.
const fn color_for(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Error => Some("\x1b[31m"),
        Severity::Warning => Some("\x1b[33m"),
        Severity::Debug => Some("\x1b[36m"),
        Severity::Verbose | Severity::All => Some("\x1b[90m"),
        Severity::Off | Severity::Info => None,
    }
}

/// Replaces control characters in a tag with `'?'` so a tag cannot split lines
/// or inject terminal sequences.
pub(crate) fn sanitize_tag(tag: &str) -> Cow<'_, str> {
    if tag.chars().all(|ch| !ch.is_control()) {
        Cow::Borrowed(tag)
    } else {
        Cow::Owned(
            tag.chars()
                .map(|ch| if ch.is_control() { '?' } else { ch })
                .collect(),
        )
    }
}

impl<W> RecordSink<W>
where
    W: Write,
{
    /// Writes `record` as one newline-terminated line.
    pub fn write<R>(&mut self, record: R) -> io::Result<()>
    where
        R: Borrow<LogRecord>,
    {
        let record = record.borrow();
        self.scratch.clear();
        let color = if self.style.color {
            color_for(record.severity())
        } else {
            None
        };

        if let Some(prefix) = color {
            self.scratch.extend_from_slice(prefix.as_bytes());
        }

        let timestamp = OffsetDateTime::from(record.timestamp()).to_offset(self.offset);
        timestamp
            .format_into(
                &mut self.scratch,
                format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
                ),
            )
            .map_err(io::Error::other)?;

        write!(
            self.scratch,
            " [{}] [{}] {}",
            record.severity().marker(),
            sanitize_tag(record.tag()),
            record.message()
        )?;

        let location = record.location();
        if self.style.location && !location.file().is_empty() {
            write!(self.scratch, " ({}:{})", location.file(), location.line())?;
        }

        if color.is_some() {
            self.scratch.extend_from_slice(RESET.as_bytes());
        }
        self.scratch.push(b'\n');

        self.writer.write_all(&self.scratch)
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Style;
    use logging::Location;
    use std::time::{Duration, UNIX_EPOCH};
    use time::UtcOffset;

    fn make_sink() -> RecordSink<Vec<u8>> {
        RecordSink::new(Vec::new()).with_offset(UtcOffset::UTC)
    }

    fn fixed(tag: &str, message: &str) -> LogRecord {
        LogRecord::new(tag, message)
            .with_timestamp(UNIX_EPOCH + Duration::from_millis(1_700_000_000_123))
    }

    fn output(sink: RecordSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).expect("utf-8")
    }

    #[test]
    fn renders_timestamp_level_tag_and_message() {
        let mut sink = make_sink();
        sink.write(fixed("net", "connected")).unwrap();
        assert_eq!(output(sink), "2023-11-14 22:13:20.123 [I] [net] connected\n");
    }

    #[test]
    fn each_record_is_one_line() {
        let mut sink = make_sink();
        for record in [fixed("a", "1"), fixed("b", "2"), fixed("c", "3")] {
            sink.write(&record).unwrap();
        }
        let text = output(sink);
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("[I] [c] 3\n"));
    }

    #[test]
    fn color_wraps_non_info_levels() {
        let mut sink = make_sink().with_style(Style {
            color: true,
            location: false,
        });
        sink.write(fixed("x", "boom").with_level(Severity::Error))
            .unwrap();
        sink.write(fixed("x", "plain")).unwrap();
        let text = output(sink);
        let mut lines = text.lines();
        let error = lines.next().unwrap();
        assert!(error.starts_with("\x1b[31m"));
        assert!(error.ends_with(RESET));
        assert!(!lines.next().unwrap().contains('\x1b'));
    }

    #[test]
    fn location_appended_when_requested() {
        let mut sink = make_sink().with_style(Style {
            color: false,
            location: true,
        });
        sink.write(fixed("x", "y").with_location(Location::new("main.rs", "main", 7)))
            .unwrap();
        assert!(output(sink).trim_end().ends_with("(main.rs:7)"));
    }

    #[test]
    fn control_characters_in_tag_are_masked() {
        let mut sink = make_sink();
        sink.write(fixed("ne\nt", "ok")).unwrap();
        assert!(output(sink).contains("[ne?t] ok"));
    }

    #[test]
    fn sanitize_borrows_clean_tags() {
        assert!(matches!(sanitize_tag("clean"), Cow::Borrowed("clean")));
        assert_eq!(sanitize_tag("a\u{1b}b"), "a?b");
    }
}
