//! Per-call overrides for `get_logger`

use crate::core::SharedFormatter;
use std::path::PathBuf;

/// Overrides applied on the first `get_logger` call for a name.
///
/// Unset fields fall back to the factory's defaults. Later calls for an
/// already-configured name ignore these options.
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub(crate) log_file_name: Option<PathBuf>,
    pub(crate) error_log_file_name: Option<PathBuf>,
    pub(crate) file_formatter: Option<SharedFormatter>,
    pub(crate) stream_formatter: Option<SharedFormatter>,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the general log file instead of `{prefix}.log`
    #[must_use = "builder methods return a new value"]
    pub fn log_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file_name = Some(path.into());
        self
    }

    /// Path of the error log file instead of `{prefix}.error.log`
    #[must_use = "builder methods return a new value"]
    pub fn error_log_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log_file_name = Some(path.into());
        self
    }

    /// Formatter for both file sinks
    #[must_use = "builder methods return a new value"]
    pub fn file_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.file_formatter = Some(formatter);
        self
    }

    /// Formatter for the console sink
    #[must_use = "builder methods return a new value"]
    pub fn stream_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.stream_formatter = Some(formatter);
        self
    }
}
