//! Rotating file sink with time-based log rotation
//!
//! The active file is archived to `{file}.{YYYY-MM-DD}` (the day the archived
//! period began) when a local-midnight boundary passes. Only the newest
//! `max_backup_files` archives are kept.

use crate::core::{
    Encoding, LogLevel, LogRecord, LoggerError, Result, SharedFormatter, Sink,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";
const COMPRESSED_SUFFIX: &str = ".gz";
const MAX_DELETION_FAILURES: usize = 5;

/// When to roll the active file over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationStrategy {
    /// Rotate at the first write after local midnight
    #[default]
    Midnight,

    /// No rotation (useful when rotation is handled externally)
    Never,
}

/// Configuration for rotating file sink
///
/// # Examples
///
/// ```
/// use logger_factory::sinks::{RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::Midnight)
///     .with_max_backups(30)
///     .with_compression(true);
/// assert_eq!(policy.max_backup_files, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Number of archived files to keep; 0 keeps every archive
    pub max_backup_files: usize,
    /// Whether to gzip archived files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Midnight,
            max_backup_files: 7,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// First local midnight strictly after `after`
fn next_midnight(after: DateTime<Local>) -> DateTime<Local> {
    after
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .unwrap_or_else(|| after + chrono::Duration::days(1))
}

struct FileState {
    writer: Option<BufWriter<File>>,
    /// Day the active file's contents belong to
    period: NaiveDate,
    next_rollover: Option<DateTime<Local>>,
    /// Consecutive rotations that failed to delete expired archives
    deletion_failure_count: usize,
}

impl FileState {
    fn schedule(&mut self, strategy: RotationStrategy, from: DateTime<Local>) {
        self.period = from.date_naive();
        self.next_rollover = match strategy {
            RotationStrategy::Midnight => Some(next_midnight(from)),
            RotationStrategy::Never => None,
        };
    }

    fn should_rotate(&self, now: DateTime<Local>) -> bool {
        self.next_rollover.is_some_and(|at| now >= at)
    }
}

/// Active log file rotating at local midnight
///
/// One `RotatingFile` owns the write handle and the rotation schedule of a path.
/// Sinks writing to the same path must share it through an `Arc` so the file is
/// rolled over exactly once per boundary. Writes are serialized by an internal
/// mutex; each line is flushed as soon as it is written.
///
/// # Examples
///
/// ```no_run
/// use logger_factory::sinks::{RotatingFile, RotationPolicy};
/// use logger_factory::Encoding;
///
/// let file = RotatingFile::open("/var/log/app.log", RotationPolicy::new().with_max_backups(14))
///     .unwrap()
///     .with_encoding(Encoding::Latin1);
/// file.write_line("started\n").unwrap();
/// ```
pub struct RotatingFile {
    base_path: PathBuf,
    policy: RotationPolicy,
    encoding: Encoding,
    state: Mutex<FileState>,
}

impl RotatingFile {
    /// Open (or create) the active file, creating its directory if needed
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be created or opened
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, last_write) = Self::open_active(&base_path)?;

        let mut state = FileState {
            writer: Some(BufWriter::new(file)),
            period: last_write.date_naive(),
            next_rollover: None,
            deletion_failure_count: 0,
        };
        state.schedule(policy.strategy, last_write);

        Ok(Self {
            base_path,
            policy,
            encoding: Encoding::default(),
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Next scheduled rollover, if the strategy rotates at all
    pub fn next_rollover(&self) -> Option<DateTime<Local>> {
        self.state.lock().next_rollover
    }

    /// Archive the active file now, regardless of the schedule
    pub fn force_rotation(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.rotate(&mut state, Local::now())
    }

    /// Encode and append one rendered line, rolling the file over first when a
    /// boundary has passed
    pub fn write_line(&self, line: &str) -> Result<()> {
        let bytes = self.encoding.encode(line);

        let mut state = self.state.lock();
        let now = Local::now();
        if state.should_rotate(now) {
            if let Err(e) = self.rotate(&mut state, now) {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );

                // Retry at the next boundary rather than on every write
                state.schedule(self.policy.strategy, now);
                if state.writer.is_none() {
                    let (file, _) = Self::open_active(&self.base_path)?;
                    state.writer = Some(BufWriter::new(file));
                }
            }
        }

        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        let written = writer.write_all(&bytes);
        written.and_then(|()| writer.flush()).map_err(|e| {
            LoggerError::file_sink(
                self.base_path.display().to_string(),
                "Failed to write log record",
                e,
            )
        })
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(self.base_path.display().to_string(), "Failed to flush", e)
            })?;
        }
        Ok(())
    }

    /// Open the active file in append mode, returning it with its last write time
    fn open_active(path: &Path) -> Result<(File, DateTime<Local>)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), "Failed to open", e)
            })?;

        let last_write = file
            .metadata()
            .and_then(|metadata| metadata.modified())
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now());

        Ok((file, last_write))
    }

    fn log_dir(&self) -> PathBuf {
        match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn file_name(&self) -> String {
        self.base_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app.log".to_string())
    }

    /// Archive path for the period that began on `day`
    fn backup_path(&self, day: NaiveDate) -> PathBuf {
        let mut path = self.base_path.clone();
        path.set_file_name(format!(
            "{}.{}",
            self.file_name(),
            day.format(BACKUP_DATE_FORMAT)
        ));
        path
    }

    fn rotate(&self, state: &mut FileState, now: DateTime<Local>) -> Result<()> {
        // Flush and release the active handle before renaming
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let backup = self.backup_path(state.period);
        let mut compressed = backup.clone().into_os_string();
        compressed.push(COMPRESSED_SUFFIX);
        let compressed = PathBuf::from(compressed);

        // An archive for the same day is replaced
        for stale in [&backup, &compressed] {
            if stale.exists() {
                let _ = fs::remove_file(stale);
            }
        }

        if self.base_path.exists() {
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                Self::compress_file(&backup, &compressed)?;
            }
        }

        self.prune_backups(state);

        let (file, _) = Self::open_active(&self.base_path)?;
        state.writer = Some(BufWriter::new(file));
        state.schedule(self.policy.strategy, now);
        Ok(())
    }

    /// Archives of this file, oldest first
    fn list_backups(&self) -> Vec<(NaiveDate, PathBuf)> {
        let prefix = format!("{}.", self.file_name());
        let Ok(entries) = fs::read_dir(self.log_dir()) else {
            return Vec::new();
        };

        let mut backups: Vec<(NaiveDate, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let suffix = name.strip_prefix(&prefix)?;
                let date = suffix.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(suffix);
                let day = NaiveDate::parse_from_str(date, BACKUP_DATE_FORMAT).ok()?;
                Some((day, entry.path()))
            })
            .collect();
        backups.sort();
        backups
    }

    /// Delete archives beyond the retention count, oldest first
    fn prune_backups(&self, state: &mut FileState) {
        if self.policy.max_backup_files == 0 {
            return;
        }

        let backups = self.list_backups();
        let excess = backups.len().saturating_sub(self.policy.max_backup_files);
        let mut deletion_failed = false;

        for (_, path) in backups.iter().take(excess) {
            if let Err(e) = fs::remove_file(path) {
                deletion_failed = true;
                eprintln!(
                    "[LOGGER WARNING] Failed to remove expired backup {}: {} (failure #{}/{})",
                    path.display(),
                    e,
                    state.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if deletion_failed {
            state.deletion_failure_count += 1;
            if state.deletion_failure_count >= MAX_DELETION_FAILURES {
                eprintln!(
                    "[LOGGER ERROR] Expired backups of {} could not be deleted {} consecutive times; \
                     check disk space and permissions.",
                    self.base_path.display(),
                    state.deletion_failure_count
                );
            }
        } else {
            state.deletion_failure_count = 0;
        }
    }

    /// Gzip `source` into `target`, removing `source` only once `target` is complete
    fn compress_file(source: &Path, target: &Path) -> Result<()> {
        let mut temp = target.to_path_buf().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let compress = || -> io::Result<()> {
            let mut reader = BufReader::with_capacity(64 * 1024, File::open(source)?);
            let output = BufWriter::with_capacity(64 * 1024, File::create(&temp)?);
            let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
            io::copy(&mut reader, &mut encoder)?;
            encoder.finish()?.flush()?;
            fs::rename(&temp, target)
        };

        if let Err(e) = compress() {
            let _ = fs::remove_file(&temp);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress {}", source.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(source) {
            eprintln!(
                "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
                source.display(),
                e
            );
        }
        Ok(())
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        // Best effort flush - ignore errors during drop
        if let Some(mut writer) = self.state.get_mut().writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Sink rendering records into a [`RotatingFile`]
///
/// Several sinks, each with its own formatter and level filter, may write into
/// one shared file.
///
/// # Examples
///
/// ```no_run
/// use logger_factory::sinks::{RotatingFileSink, RotationPolicy};
/// use logger_factory::{Formatter, LogLevel};
/// use std::sync::Arc;
///
/// let errors = RotatingFileSink::open(
///     "/var/log/app.error.log",
///     Arc::new(Formatter::default_file()),
///     RotationPolicy::new().with_max_backups(14),
/// )
/// .unwrap()
/// .with_level_filter(LogLevel::Error);
/// ```
pub struct RotatingFileSink {
    name: String,
    level_filter: Option<LogLevel>,
    formatter: SharedFormatter,
    file: Arc<RotatingFile>,
}

impl RotatingFileSink {
    pub fn new(file: Arc<RotatingFile>, formatter: SharedFormatter) -> Self {
        Self {
            name: "rotating_file".to_string(),
            level_filter: None,
            formatter,
            file,
        }
    }

    /// Sink over a file of its own
    pub fn open<P: AsRef<Path>>(
        path: P,
        formatter: SharedFormatter,
        policy: RotationPolicy,
    ) -> Result<Self> {
        let file = RotatingFile::open(path, policy)?;
        Ok(Self::new(Arc::new(file), formatter))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Only accept records at `level` or above
    #[must_use]
    pub fn with_level_filter(mut self, level: LogLevel) -> Self {
        self.level_filter = Some(level);
        self
    }

    pub fn file(&self) -> &Arc<RotatingFile> {
        &self.file
    }

    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }
}

impl Sink for RotatingFileSink {
    fn append(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.render(record);
        line.push('\n');
        self.file.write_line(&line)
    }

    fn flush(&self) -> Result<()> {
        self.file.flush()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn level_filter(&self) -> Option<LogLevel> {
        self.level_filter
    }

    fn path(&self) -> Option<&Path> {
        Some(self.file.path())
    }
}
