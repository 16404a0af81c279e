//! Pattern formatters
//!
//! A [`Formatter`] turns a [`LogRecord`] into one line of text. Patterns use
//! named placeholders:
//!
//! - `{loggerName}`: name of the logger that emitted the record
//! - `{threadName}`: name (or id) of the emitting thread
//! - `{timestamp}`: record time rendered with the formatter's strftime format
//! - `{level}`: severity name (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`)
//! - `{message}`: the logged message
//!
//! Any other `{...}` token is copied to the output unchanged.

use super::log_record::LogRecord;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Field layout shared by the standard file and console formatters
pub const DEFAULT_PATTERN: &str = "{loggerName} {threadName}; {timestamp}; {level}; {message}";

/// Date and time with second precision, used for file output
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time of day only, used for console output
pub const STREAM_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Renders a record to a single line.
///
/// Implementations must be free of observable side effects on the record and
/// safe to share between sinks and threads.
pub trait RecordFormatter: Send + Sync + fmt::Debug {
    fn render(&self, record: &LogRecord) -> String;
}

/// Formatter handle shared between a factory and the sinks it builds
pub type SharedFormatter = Arc<dyn RecordFormatter>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    LoggerName,
    ThreadName,
    Timestamp,
    Level,
    Message,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "loggerName" => Some(Field::LoggerName),
            "threadName" => Some(Field::ThreadName),
            "timestamp" => Some(Field::Timestamp),
            "level" => Some(Field::Level),
            "message" => Some(Field::Message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Immutable pattern formatter
///
/// # Examples
///
/// ```
/// use logger_factory::{Formatter, LogLevel, LogRecord};
///
/// let formatter = Formatter::new("[{level}] {message}", "%H:%M");
/// let record = LogRecord::new("app", LogLevel::Info, "ready");
/// assert_eq!(formatter.render(&record), "[INFO] ready");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pattern: String,
    timestamp_format: String,
    segments: Vec<Segment>,
}

impl Formatter {
    pub fn new(pattern: impl Into<String>, timestamp_format: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = Self::parse_pattern(&pattern);
        Self {
            pattern,
            timestamp_format: timestamp_format.into(),
            segments,
        }
    }

    /// Standard formatter for file sinks: `name thread; YYYY-MM-DD HH:MM:SS; LEVEL; message`
    #[must_use]
    pub fn default_file() -> Self {
        Self::new(DEFAULT_PATTERN, FILE_TIMESTAMP_FORMAT)
    }

    /// Standard formatter for the console sink: `name thread; HH:MM:SS; LEVEL; message`
    #[must_use]
    pub fn default_stream() -> Self {
        Self::new(DEFAULT_PATTERN, STREAM_TIMESTAMP_FORMAT)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Render a record with this formatter's pattern
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.pattern.len() + record.message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::LoggerName) => out.push_str(&record.logger_name),
                Segment::Field(Field::ThreadName) => out.push_str(&record.thread_name),
                Segment::Field(Field::Timestamp) => self.write_timestamp(&mut out, record),
                Segment::Field(Field::Level) => out.push_str(record.level.to_str()),
                Segment::Field(Field::Message) => out.push_str(&record.message),
            }
        }
        out
    }

    // chrono reports malformed strftime specifiers as a fmt error; the raw
    // format string is emitted instead so rendering never fails.
    fn write_timestamp(&self, out: &mut String, record: &LogRecord) {
        let mut rendered = String::new();
        if write!(rendered, "{}", record.timestamp.format(&self.timestamp_format)).is_err() {
            rendered.clear();
            rendered.push_str(&self.timestamp_format);
        }
        out.push_str(&rendered);
    }

    fn parse_pattern(pattern: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('}') else {
                literal.push_str(&rest[open..]);
                rest = "";
                break;
            };

            let token = &after_open[..close];
            match Field::parse(token) {
                Some(field) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                None => {
                    literal.push('{');
                    literal.push_str(token);
                    literal.push('}');
                }
            }
            rest = &after_open[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::default_file()
    }
}

impl RecordFormatter for Formatter {
    fn render(&self, record: &LogRecord) -> String {
        Formatter::render(self, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use chrono::{Local, TimeZone};

    fn fixed_record(level: LogLevel, message: &str) -> LogRecord {
        let timestamp = Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        LogRecord::new("app.db", level, message)
            .with_timestamp(timestamp)
            .with_thread_name("main")
    }

    #[test]
    fn test_default_file_layout() {
        let line = Formatter::default_file().render(&fixed_record(LogLevel::Warning, "disk low"));
        assert_eq!(line, "app.db main; 2025-01-08 10:30:45; WARNING; disk low");
    }

    #[test]
    fn test_default_stream_layout() {
        let line = Formatter::default_stream().render(&fixed_record(LogLevel::Info, "ready"));
        assert_eq!(line, "app.db main; 10:30:45; INFO; ready");
    }

    #[test]
    fn test_unknown_placeholders_are_verbatim() {
        let formatter = Formatter::new("{process} {level} {message", "%H");
        let line = formatter.render(&fixed_record(LogLevel::Error, "x"));
        assert_eq!(line, "{process} ERROR {message");
    }

    #[test]
    fn test_invalid_timestamp_format_renders_raw() {
        let formatter = Formatter::new("{timestamp}|{message}", "%Q-bogus");
        let line = formatter.render(&fixed_record(LogLevel::Info, "ok"));
        assert_eq!(line, "%Q-bogus|ok");
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let formatter = Formatter::default_file();
        let before = formatter.clone();
        let record = fixed_record(LogLevel::Critical, "boom");
        assert_eq!(formatter.render(&record), formatter.render(&record));
        assert_eq!(formatter, before);
    }

    #[test]
    fn test_shared_through_trait_object() {
        let shared: SharedFormatter = Arc::new(Formatter::new("{level}:{message}", "%H"));
        let record = fixed_record(LogLevel::Debug, "trace me");
        assert_eq!(shared.render(&record), "DEBUG:trace me");
    }
}
