//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};
use std::path::Path;

/// A destination for rendered records.
///
/// Sinks are shared between threads and serialize their own writes, so the
/// emission path never needs an outer lock.
pub trait Sink: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;

    /// Minimum level this sink accepts, independent of the logger's level
    fn level_filter(&self) -> Option<LogLevel> {
        None
    }

    /// File backing this sink, if any
    fn path(&self) -> Option<&Path> {
        None
    }

    fn accepts(&self, level: LogLevel) -> bool {
        self.level_filter().map_or(true, |min| level >= min)
    }
}
