//! Line emitter for change records.

use std::io::{self, Write};

use brokerwatch_types::Reading;
use chrono::{DateTime, Local, TimeZone};

/// Writes one line per reading and flushes after every line.
///
/// Downstream consumers tail this stream live, so nothing is held back in a
/// buffer between lines. Wrap the writer in nothing that buffers.
///
/// # Example
///
/// ```rust
/// use brokerwatch::LineEmitter;
/// use brokerwatch_types::QueueReading;
///
/// let mut emitter = LineEmitter::new(Vec::new());
/// emitter
///     .emit("2020-05-21T22:37:29+00:00", &QueueReading::new("jobs", "running", 0, 0))
///     .unwrap();
///
/// assert_eq!(
///     String::from_utf8(emitter.into_inner()).unwrap(),
///     "2020-05-21T22:37:29+00:00 jobs running 0 0\n"
/// );
/// ```
#[derive(Debug)]
pub struct LineEmitter<W: Write> {
    writer: W,
}

impl LineEmitter<io::Stdout> {
    /// Emit to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `<timestamp> <fields...>` and flush.
    pub fn emit<R: Reading>(&mut self, timestamp: &str, reading: &R) -> io::Result<()> {
        writeln!(self.writer, "{} {}", timestamp, reading)?;
        self.writer.flush()
    }

    /// Write `<fields...>` without a timestamp and flush.
    pub fn emit_plain<R: Reading>(&mut self, reading: &R) -> io::Result<()> {
        writeln!(self.writer, "{}", reading)?;
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// The current local time as ISO-8601 with offset, whole seconds.
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}

/// Format e.g. `2020-05-21T22:37:29+00:00`.
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
