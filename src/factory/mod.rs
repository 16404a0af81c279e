//! Logger factory
//!
//! [`LoggerFactory::get_logger`] returns the logger registered under a name,
//! wiring it on first use to three sinks:
//!
//! 1. a general file (`{prefix}.log`) receiving every record the logger accepts,
//! 2. an error file (`{prefix}.error.log`) receiving `ERROR` and above only,
//! 3. the console (standard output).
//!
//! Both files rotate at local midnight and keep `backup_count` archives. Every
//! logger writing to a path shares one file handle from the registry, so the
//! file is rolled over once no matter how many loggers use it.
//!
//! # Example
//!
//! ```no_run
//! use logger_factory::{LogLevel, LoggerFactory};
//!
//! let factory = LoggerFactory::new("logs/app").unwrap();
//! let logger = factory.get_logger("app.http", LogLevel::Info).unwrap();
//! logger.info("listening on :8080");
//! logger.error("upstream unavailable"); // also lands in logs/app.error.log
//! ```

pub mod config;
pub mod options;

pub use config::{FactoryConfig, DEFAULT_BACKUP_COUNT};
pub use options::LoggerOptions;

use crate::core::{
    registry::validate_name, Encoding, Formatter, LogLevel, Logger, LoggerError,
    LoggerRegistry, RegistryGuard, Result, SharedFormatter, Sink,
};
use crate::sinks::{ConsoleSink, ConsoleTarget, RotatingFileSink, RotationPolicy, RotationStrategy};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sink name of the general file sink
pub const FILE_SINK_NAME: &str = "file";
/// Sink name of the `ERROR`-filtered file sink
pub const ERROR_FILE_SINK_NAME: &str = "error_file";

/// Builds named loggers that share file prefix, retention and formatting defaults.
///
/// The factory itself is immutable; all shared mutable state lives in its
/// [`LoggerRegistry`], whose lock serializes every `get_logger` call.
#[derive(Debug, Clone)]
pub struct LoggerFactory {
    file_prefix: String,
    backup_count: usize,
    encoding: Encoding,
    compress_backups: bool,
    file_formatter: SharedFormatter,
    stream_formatter: SharedFormatter,
    console: ConsoleTarget,
    registry: Arc<LoggerRegistry>,
}

impl LoggerFactory {
    /// Factory with default retention (7), UTF-8 and the standard formatters
    pub fn new(log_files_prefix: impl Into<String>) -> Result<Self> {
        Self::builder(log_files_prefix).build()
    }

    #[must_use]
    pub fn builder(log_files_prefix: impl Into<String>) -> LoggerFactoryBuilder {
        LoggerFactoryBuilder::new(log_files_prefix)
    }

    pub fn from_config(config: FactoryConfig) -> Result<Self> {
        Self::builder(config.log_files_prefix)
            .backup_count(config.backup_count)
            .encoding(config.encoding.as_str())
            .compress_backups(config.compress_backups)
            .build()
    }

    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn file_formatter(&self) -> &SharedFormatter {
        &self.file_formatter
    }

    pub fn stream_formatter(&self) -> &SharedFormatter {
        &self.stream_formatter
    }

    pub fn console(&self) -> &ConsoleTarget {
        &self.console
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// Default general log path, `{prefix}.log`
    pub fn log_file_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.log", self.file_prefix))
    }

    /// Default error log path, `{prefix}.error.log`
    pub fn error_log_file_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.error.log", self.file_prefix))
    }

    /// Return the logger for `name`, configuring it on first use.
    ///
    /// Equivalent to [`get_logger_with`](Self::get_logger_with) with no overrides.
    pub fn get_logger(&self, name: &str, level: LogLevel) -> Result<Arc<Logger>> {
        self.get_logger_with(name, level, LoggerOptions::default())
    }

    /// Return the logger for `name`, configuring it on first use.
    ///
    /// The first successful call for a name attaches the general file, error file
    /// and console sinks, sets the level and disables propagation. Every later
    /// call leaves the sinks alone and only lowers the level when `level` is more
    /// verbose than the current one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid name and an I/O error when a
    /// log file cannot be opened. On error no sink is attached.
    pub fn get_logger_with(
        &self,
        name: &str,
        level: LogLevel,
        options: LoggerOptions,
    ) -> Result<Arc<Logger>> {
        validate_name(name)?;

        let mut registry = self.registry.lock();

        let log_file = options
            .log_file_name
            .unwrap_or_else(|| self.log_file_path());
        let error_log_file = options
            .error_log_file_name
            .unwrap_or_else(|| self.error_log_file_path());
        let file_formatter = options
            .file_formatter
            .unwrap_or_else(|| Arc::clone(&self.file_formatter));
        let stream_formatter = options
            .stream_formatter
            .unwrap_or_else(|| Arc::clone(&self.stream_formatter));

        if let Some(existing) = registry.get(name) {
            if existing.has_sinks() {
                if level < existing.level() {
                    existing.set_level(level);
                }
                return Ok(existing);
            }
        }

        // All sinks are built before the logger is touched so a failure leaves
        // it absent or bare, never half-wired.
        let sinks = self.build_sinks(
            &mut registry,
            &log_file,
            &error_log_file,
            file_formatter,
            stream_formatter,
        )?;

        let logger = registry.get_or_create(name)?;
        logger.set_level(level);
        logger.attach_sinks(sinks);
        Ok(logger)
    }

    fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_strategy(RotationStrategy::Midnight)
            .with_max_backups(self.backup_count)
            .with_compression(self.compress_backups)
    }

    fn build_sinks(
        &self,
        registry: &mut RegistryGuard<'_>,
        log_file: &Path,
        error_log_file: &Path,
        file_formatter: SharedFormatter,
        stream_formatter: SharedFormatter,
    ) -> Result<Vec<Arc<dyn Sink>>> {
        let policy = self.rotation_policy();

        let general_file = registry.shared_file(log_file, &policy, self.encoding)?;
        let general = RotatingFileSink::new(general_file, Arc::clone(&file_formatter))
            .with_name(FILE_SINK_NAME);

        let error_file = registry.shared_file(error_log_file, &policy, self.encoding)?;
        let errors = RotatingFileSink::new(error_file, file_formatter)
            .with_name(ERROR_FILE_SINK_NAME)
            .with_level_filter(LogLevel::Error);

        let console = ConsoleSink::for_target(stream_formatter, &self.console);

        Ok(vec![
            Arc::new(general) as Arc<dyn Sink>,
            Arc::new(errors),
            Arc::new(console),
        ])
    }
}

/// Builder for [`LoggerFactory`]
///
/// # Example
///
/// ```
/// use logger_factory::{Formatter, LoggerFactory};
/// use std::sync::Arc;
///
/// let factory = LoggerFactory::builder("logs/worker")
///     .backup_count(14)
///     .encoding("utf-8")
///     .stream_formatter(Arc::new(Formatter::new("{level}: {message}", "%H:%M:%S")))
///     .build()
///     .unwrap();
/// assert_eq!(factory.backup_count(), 14);
/// ```
pub struct LoggerFactoryBuilder {
    file_prefix: String,
    backup_count: usize,
    encoding: String,
    compress_backups: bool,
    file_formatter: Option<SharedFormatter>,
    stream_formatter: Option<SharedFormatter>,
    console: ConsoleTarget,
    registry: Option<Arc<LoggerRegistry>>,
}

impl LoggerFactoryBuilder {
    pub fn new(log_files_prefix: impl Into<String>) -> Self {
        Self {
            file_prefix: log_files_prefix.into(),
            backup_count: DEFAULT_BACKUP_COUNT,
            encoding: Encoding::default().as_str().to_string(),
            compress_backups: false,
            file_formatter: None,
            stream_formatter: None,
            console: ConsoleTarget::default(),
            registry: None,
        }
    }

    /// Archives kept per log file; 0 keeps every archive
    #[must_use = "builder methods return a new value"]
    pub fn backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    /// Encoding name, e.g. `"utf-8"`, `"ascii"` or `"latin-1"`
    #[must_use = "builder methods return a new value"]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress_backups(mut self, enabled: bool) -> Self {
        self.compress_backups = enabled;
        self
    }

    /// Default formatter for file sinks
    #[must_use = "builder methods return a new value"]
    pub fn file_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.file_formatter = Some(formatter);
        self
    }

    /// Default formatter for the console sink
    #[must_use = "builder methods return a new value"]
    pub fn stream_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.stream_formatter = Some(formatter);
        self
    }

    /// Destination of console sinks, standard output by default
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, target: ConsoleTarget) -> Self {
        self.console = target;
        self
    }

    /// Use `registry` instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn registry(mut self, registry: Arc<LoggerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<LoggerFactory> {
        if self.file_prefix.trim().is_empty() {
            return Err(LoggerError::config(
                "LoggerFactory",
                "log files prefix must not be empty",
            ));
        }
        let encoding: Encoding = self.encoding.parse()?;

        Ok(LoggerFactory {
            file_prefix: self.file_prefix,
            backup_count: self.backup_count,
            encoding,
            compress_backups: self.compress_backups,
            file_formatter: self
                .file_formatter
                .unwrap_or_else(|| Arc::new(Formatter::default_file())),
            stream_formatter: self
                .stream_formatter
                .unwrap_or_else(|| Arc::new(Formatter::default_stream())),
            console: self.console,
            registry: self.registry.unwrap_or_else(LoggerRegistry::global),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::fs;
    use std::io;
    use tempfile::{tempdir, TempDir};

    fn isolated_factory(dir: &TempDir) -> LoggerFactory {
        LoggerFactory::builder(dir.path().join("app").display().to_string())
            .file_formatter(Arc::new(Formatter::new("{loggerName} {message}", "%H")))
            .console(ConsoleTarget::writer(io::sink()))
            .registry(Arc::new(LoggerRegistry::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let factory = LoggerFactory::builder("app")
            .registry(Arc::new(LoggerRegistry::new()))
            .build()
            .unwrap();

        assert_eq!(factory.backup_count(), 7);
        assert_eq!(factory.encoding(), Encoding::Utf8);
        assert_eq!(factory.log_file_path(), PathBuf::from("app.log"));
        assert_eq!(factory.error_log_file_path(), PathBuf::from("app.error.log"));
    }

    #[test]
    fn test_invalid_construction() {
        let empty = LoggerFactory::builder("  ").build().unwrap_err();
        assert!(empty.is_configuration());

        let encoding = LoggerFactory::builder("app").encoding("utf-16").build().unwrap_err();
        assert!(encoding.is_configuration());
    }

    #[test]
    fn test_first_call_attaches_three_sinks_in_order() {
        let dir = tempdir().unwrap();
        let factory = isolated_factory(&dir);

        let logger = factory.get_logger("svc", LogLevel::Info).unwrap();
        let sinks = logger.sinks();

        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec![FILE_SINK_NAME, ERROR_FILE_SINK_NAME, "console"]);
        assert_eq!(sinks[0].level_filter(), None);
        assert_eq!(sinks[1].level_filter(), Some(LogLevel::Error));
        assert_eq!(sinks[2].level_filter(), None);
        assert_eq!(sinks[0].path(), Some(dir.path().join("app.log").as_path()));
        assert_eq!(sinks[1].path(), Some(dir.path().join("app.error.log").as_path()));
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(!logger.propagates());
    }

    #[test]
    fn test_second_call_keeps_sinks_and_widens_only() {
        let dir = tempdir().unwrap();
        let factory = isolated_factory(&dir);

        let first = factory.get_logger("svc", LogLevel::Info).unwrap();
        let second = factory
            .get_logger_with(
                "svc",
                LogLevel::Debug,
                LoggerOptions::new().log_file_name(dir.path().join("ignored.log")),
            )
            .unwrap();
        let third = factory.get_logger("svc", LogLevel::Warning).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(first.sink_count(), 3);
        assert_eq!(first.level(), LogLevel::Debug);
        assert!(!dir.path().join("ignored.log").exists());
    }

    #[test]
    fn test_failed_attachment_leaves_no_sinks() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not directory").unwrap();

        let factory = LoggerFactory::builder(blocker.join("app").display().to_string())
            .registry(Arc::new(LoggerRegistry::new()))
            .build()
            .unwrap();

        let err = factory.get_logger("svc", LogLevel::Info).unwrap_err();
        assert!(err.is_io());
        assert!(factory.registry().get("svc").is_none());

        // General file opens, error file cannot: still nothing attached
        let err = factory
            .get_logger_with(
                "svc",
                LogLevel::Info,
                LoggerOptions::new().log_file_name(dir.path().join("ok.log")),
            )
            .unwrap_err();
        assert!(err.is_io());
        assert!(factory.registry().get("svc").is_none());

        let logger = factory
            .get_logger_with(
                "svc",
                LogLevel::Info,
                LoggerOptions::new()
                    .log_file_name(dir.path().join("ok.log"))
                    .error_log_file_name(dir.path().join("ok.error.log")),
            )
            .unwrap();
        assert_eq!(logger.sink_count(), 3);
    }

    #[test]
    fn test_loggers_share_one_file_per_path() {
        let dir = tempdir().unwrap();
        let factory = isolated_factory(&dir);

        let a = factory.get_logger("a", LogLevel::Info).unwrap();
        let b = factory.get_logger("b", LogLevel::Info).unwrap();
        assert_eq!(factory.registry().file_count(), 2);

        a.info("before");
        b.info("before");

        let file = factory.registry().file(factory.log_file_path()).unwrap();
        file.force_rotation().unwrap();

        a.info("after");
        b.info("after");

        let backup = dir
            .path()
            .join(format!("app.log.{}", Local::now().format("%Y-%m-%d")));
        assert_eq!(fs::read_to_string(backup).unwrap(), "a before\nb before\n");
        assert_eq!(
            fs::read_to_string(factory.log_file_path()).unwrap(),
            "a after\nb after\n"
        );
    }

    #[test]
    fn test_factories_on_one_registry_share_files() {
        let dir = tempdir().unwrap();
        let registry = Arc::new(LoggerRegistry::new());
        let prefix = dir.path().join("app").display().to_string();
        let build = || {
            LoggerFactory::builder(prefix.clone())
                .console(ConsoleTarget::writer(io::sink()))
                .registry(Arc::clone(&registry))
                .build()
                .unwrap()
        };

        build().get_logger("one", LogLevel::Info).unwrap();
        build().get_logger("two", LogLevel::Info).unwrap();

        assert_eq!(registry.file_count(), 2);
    }

    #[test]
    fn test_console_target_receives_stream_output() {
        let dir = tempdir().unwrap();
        let captured = Arc::new(parking_lot::Mutex::new(Vec::new()));

        struct Capture(Arc<parking_lot::Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let factory = LoggerFactory::builder(dir.path().join("app").display().to_string())
            .stream_formatter(Arc::new(Formatter::new("{level} {message}", "%H")))
            .console(ConsoleTarget::writer(Capture(Arc::clone(&captured))))
            .registry(Arc::new(LoggerRegistry::new()))
            .build()
            .unwrap();

        factory.get_logger("x", LogLevel::Info).unwrap().warning("on console");
        factory.get_logger("y", LogLevel::Info).unwrap().info("also");

        let output = String::from_utf8(captured.lock().clone()).unwrap();
        assert_eq!(output, "WARNING on console\nINFO also\n");
    }

    #[test]
    fn test_bare_registry_logger_is_configured_later() {
        let dir = tempdir().unwrap();
        let factory = isolated_factory(&dir);

        let bare = factory.registry().get_or_create("svc.worker").unwrap();
        assert_eq!(bare.sink_count(), 0);
        assert!(bare.propagates());

        let configured = factory.get_logger("svc.worker", LogLevel::Error).unwrap();
        assert!(Arc::ptr_eq(&bare, &configured));
        assert_eq!(configured.sink_count(), 3);
        assert_eq!(configured.level(), LogLevel::Error);
        assert!(!configured.propagates());
    }

    #[test]
    fn test_invalid_name() {
        let dir = tempdir().unwrap();
        let factory = isolated_factory(&dir);

        let err = factory.get_logger("", LogLevel::Info).unwrap_err();
        assert!(err.is_configuration());
        assert!(factory.registry().is_empty());
    }

    #[test]
    fn test_from_config() {
        let dir = tempdir().unwrap();
        let mut config = FactoryConfig::new(dir.path().join("cfg").display().to_string());
        config.backup_count = 2;
        config.encoding = Encoding::Ascii;

        let factory = LoggerFactory::from_config(config).unwrap();
        assert_eq!(factory.backup_count(), 2);
        assert_eq!(factory.encoding(), Encoding::Ascii);
        assert_eq!(factory.log_file_path(), dir.path().join("cfg.log"));
    }
}
