//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::cell::RefCell;

// Thread-local cache so the thread label is computed once per thread
thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Name of the current thread, or its id when the thread is unnamed
fn current_thread_name() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let current = std::thread::current();
                current
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{:?}", current.id()))
            })
            .clone()
    })
}

/// A single event emitted through a [`Logger`](super::Logger).
///
/// Records are built once per log call and handed by reference to every sink,
/// each of which renders it with its own formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub logger_name: String,
    pub thread_name: String,
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so that one record always renders as one line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(logger_name: impl Into<String>, level: LogLevel, message: &str) -> Self {
        Self {
            logger_name: logger_name.into(),
            thread_name: current_thread_name(),
            timestamp: Local::now(),
            level,
            message: Self::sanitize_message(message),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }
}
