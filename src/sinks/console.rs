//! Console sink implementation

use crate::core::{LogRecord, LoggerError, Result, SharedFormatter, Sink};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Writer shared by every console sink built for one target
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Where console sinks write
#[derive(Clone, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    /// A caller-supplied writer, shared by all sinks using this target
    Writer(SharedWriter),
}

impl ConsoleTarget {
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        ConsoleTarget::Writer(Arc::new(Mutex::new(Box::new(writer))))
    }
}

impl fmt::Debug for ConsoleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleTarget::Stdout => f.write_str("Stdout"),
            ConsoleTarget::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Writes rendered records to standard output, or to any writer supplied
/// through [`ConsoleSink::with_writer`] or a [`ConsoleTarget`].
pub struct ConsoleSink {
    formatter: SharedFormatter,
    writer: SharedWriter,
}

impl ConsoleSink {
    pub fn stdout(formatter: SharedFormatter) -> Self {
        Self::with_writer(formatter, io::stdout())
    }

    pub fn with_writer(formatter: SharedFormatter, writer: impl Write + Send + 'static) -> Self {
        Self {
            formatter,
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn for_target(formatter: SharedFormatter, target: &ConsoleTarget) -> Self {
        match target {
            ConsoleTarget::Stdout => Self::stdout(formatter),
            ConsoleTarget::Writer(writer) => Self {
                formatter,
                writer: Arc::clone(writer),
            },
        }
    }

    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }
}

impl Sink for ConsoleSink {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.render(record);
        line.push('\n');

        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::io_operation("writing to console", "write failed", e))?;
        writer
            .flush()
            .map_err(|e| LoggerError::io_operation("writing to console", "flush failed", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Formatter, LogLevel};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_renders_one_line_per_record() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::with_writer(
            Arc::new(Formatter::new("{level} {message}", "%H")),
            buffer.clone(),
        );

        sink.append(&LogRecord::new("app", LogLevel::Info, "first")).unwrap();
        sink.append(&LogRecord::new("app", LogLevel::Error, "second")).unwrap();

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(output, "INFO first\nERROR second\n");
        assert_eq!(sink.level_filter(), None);
        assert_eq!(sink.name(), "console");
    }

    #[test]
    fn test_sinks_on_one_target_share_the_writer() {
        let buffer = SharedBuffer::default();
        let target = ConsoleTarget::writer(buffer.clone());
        let first = ConsoleSink::for_target(Arc::new(Formatter::new("a {message}", "%H")), &target);
        let second = ConsoleSink::for_target(Arc::new(Formatter::new("b {message}", "%H")), &target);

        first.append(&LogRecord::new("x", LogLevel::Info, "1")).unwrap();
        second.append(&LogRecord::new("y", LogLevel::Info, "2")).unwrap();

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(output, "a 1\nb 2\n");
    }
}
