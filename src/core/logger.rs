//! Named logger

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::Sink,
};
use parking_lot::RwLock;
use std::fmt::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A named logger fanning records out to its sinks.
///
/// Loggers are owned by a [`LoggerRegistry`](super::LoggerRegistry), which hands out
/// shared `Arc<Logger>` handles; there is at most one logger per name in a registry.
/// Logging never takes the registry lock: the level gate is a read lock and each
/// sink serializes its own writes.
pub struct Logger {
    name: String,
    min_level: RwLock<LogLevel>,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    propagate: AtomicBool,
    parent: RwLock<Option<Arc<Logger>>>,
    metrics: LoggerMetrics,
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: RwLock::new(LogLevel::default()),
            sinks: RwLock::new(Vec::new()),
            propagate: AtomicBool::new(true),
            parent: RwLock::new(None),
            metrics: LoggerMetrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub(crate) fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    /// Whether records are also handed to the parent logger's sinks
    pub fn propagates(&self) -> bool {
        self.propagate.load(Ordering::Acquire)
    }

    pub fn parent(&self) -> Option<Arc<Logger>> {
        self.parent.read().clone()
    }

    pub(crate) fn set_parent(&self, parent: Option<Arc<Logger>>) {
        *self.parent.write() = parent;
    }

    pub fn has_sinks(&self) -> bool {
        !self.sinks.read().is_empty()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Snapshot of the attached sinks, in attachment order
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().clone()
    }

    /// Attach a complete sink set in one step.
    ///
    /// Once a logger owns sinks it stops propagating to its parent.
    pub(crate) fn attach_sinks(&self, sinks: Vec<Arc<dyn Sink>>) {
        let mut attached = self.sinks.write();
        attached.extend(sinks);
        if !attached.is_empty() {
            self.propagate.store(false, Ordering::Release);
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Log a message, reporting sink failures on stderr
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        if let Err(e) = self.try_log(level, message) {
            eprintln!("[LOGGER ERROR] Logger '{}' failed to emit record: {}", self.name, e);
        }
    }

    /// Log a message, returning the first sink failure.
    ///
    /// Every accepting sink is still attempted when an earlier one fails.
    pub fn try_log(&self, level: LogLevel, message: impl AsRef<str>) -> Result<()> {
        if !self.is_enabled_for(level) {
            self.metrics.record_filtered();
            return Ok(());
        }

        let record = LogRecord::new(self.name.as_str(), level, message.as_ref());
        self.dispatch(&record)
    }

    /// Log an error together with its chain of sources at `ERROR` level
    pub fn exception(&self, message: impl AsRef<str>, error: &dyn std::error::Error) {
        if !self.is_enabled_for(LogLevel::Error) {
            self.metrics.record_filtered();
            return;
        }

        let mut text = format!("{}: {}", message.as_ref(), error);
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = write!(text, " | caused by: {}", cause);
            source = cause.source();
        }
        self.log(LogLevel::Error, text);
    }

    fn dispatch(&self, record: &LogRecord) -> Result<()> {
        let mut first_error = None;

        let mut delivered = Self::emit_to_sinks(&self.sinks.read(), record, &mut first_error);

        let mut next = if self.propagates() { self.parent() } else { None };
        while let Some(ancestor) = next {
            delivered += Self::emit_to_sinks(&ancestor.sinks.read(), record, &mut first_error);
            next = if ancestor.propagates() { ancestor.parent() } else { None };
        }

        match first_error {
            Some(e) => {
                self.metrics.record_dropped();
                Err(e)
            }
            None => {
                // Nothing accepted the record, so nothing was written
                if delivered > 0 {
                    self.metrics.record_logged();
                }
                Ok(())
            }
        }
    }

    /// Hand a record to every accepting sink with per-sink panic isolation,
    /// returning how many sinks accepted it
    fn emit_to_sinks(
        sinks: &[Arc<dyn Sink>],
        record: &LogRecord,
        first_error: &mut Option<LoggerError>,
    ) -> usize {
        let mut accepted = 0;
        for sink in sinks.iter().filter(|sink| sink.accepts(record.level)) {
            accepted += 1;
            let append_result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.append(record)));

            let error = match append_result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    LoggerError::writer(format!("sink '{}' panicked: {}", sink.name(), panic_msg))
                }
            };

            if first_error.is_some() {
                eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), error);
            } else {
                *first_error = Some(error);
            }
        }
        accepted
    }

    pub fn flush(&self) -> Result<()> {
        for sink in self.sinks.read().iter() {
            sink.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("sinks", &self.sink_count())
            .field("propagate", &self.propagates())
            .finish()
    }
}
