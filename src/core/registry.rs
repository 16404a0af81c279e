//! Registry mapping logger names to their single live instance
//!
//! The process-wide registry returned by [`LoggerRegistry::global`] is created
//! empty on first use and lives until the process exits; loggers are never
//! removed from it. Its mutex is the exclusive lock that
//! [`LoggerFactory::get_logger`](crate::LoggerFactory::get_logger) holds across
//! lookup and sink attachment, so factories sharing a registry can never attach
//! two sink sets to one name.
//!
//! The registry also owns one [`RotatingFile`] per log path. Every logger that
//! writes to a path shares that handle, so a file has a single writer and a
//! single rotation schedule.

use super::error::{LoggerError, Result};
use super::logger::Logger;
use super::encoding::Encoding;
use crate::sinks::{RotatingFile, RotationPolicy};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{hash_map::Entry, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static GLOBAL: Lazy<Arc<LoggerRegistry>> = Lazy::new(|| Arc::new(LoggerRegistry::new()));

#[derive(Default)]
struct RegistryState {
    loggers: HashMap<String, Arc<Logger>>,
    files: HashMap<PathBuf, Arc<RotatingFile>>,
}

/// Name → logger map guarded by one exclusive lock
#[derive(Default)]
pub struct LoggerRegistry {
    state: Mutex<RegistryState>,
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LoggerRegistry")
            .field("loggers", &state.loggers.len())
            .field("files", &state.files.len())
            .finish()
    }
}

/// Map key for a log path, made absolute so relative and absolute spellings of
/// one file share a handle
fn file_key(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl LoggerRegistry {
    /// Create an isolated registry, independent of the global one
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<LoggerRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Acquire the registry's exclusive lock
    pub fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            state: self.state.lock(),
        }
    }

    /// Look up a logger without creating it
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.lock().get(name)
    }

    /// Return the logger for `name`, creating a bare one (no sinks) if needed
    pub fn get_or_create(&self, name: &str) -> Result<Arc<Logger>> {
        self.lock().get_or_create(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().loggers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.state.lock().loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().loggers.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().loggers.keys().cloned().collect();
        names.sort();
        names
    }

    /// The shared handle of an already opened log file
    pub fn file(&self, path: impl AsRef<Path>) -> Option<Arc<RotatingFile>> {
        self.state.lock().files.get(&file_key(path.as_ref())).cloned()
    }

    /// Number of distinct log files opened through this registry
    pub fn file_count(&self) -> usize {
        self.state.lock().files.len()
    }
}

/// Reject names with empty dotted segments (`""`, `".a"`, `"a."`, `"a..b"`)
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(LoggerError::config(
            "Logger",
            format!("invalid logger name '{}'", name),
        ));
    }
    Ok(())
}

/// Exclusive access to a registry's name map
pub struct RegistryGuard<'a> {
    state: MutexGuard<'a, RegistryState>,
}

impl RegistryGuard<'_> {
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.state.loggers.get(name).cloned()
    }

    /// Return the shared handle for `path`, opening it on first use.
    ///
    /// `policy` and `encoding` only apply when the file is opened here; later
    /// callers share the existing handle as configured by the first.
    pub fn shared_file(
        &mut self,
        path: &Path,
        policy: &RotationPolicy,
        encoding: Encoding,
    ) -> Result<Arc<RotatingFile>> {
        match self.state.files.entry(file_key(path)) {
            Entry::Occupied(o) => Ok(Arc::clone(o.get())),
            Entry::Vacant(v) => {
                let file = RotatingFile::open(path, policy.clone())?.with_encoding(encoding);
                Ok(Arc::clone(v.insert(Arc::new(file))))
            }
        }
    }

    /// Return the logger for `name`, creating and linking it into the hierarchy if absent
    pub fn get_or_create(&mut self, name: &str) -> Result<Arc<Logger>> {
        validate_name(name)?;

        let logger = match self.state.loggers.entry(name.to_string()) {
            Entry::Occupied(o) => return Ok(Arc::clone(o.get())),
            Entry::Vacant(v) => Arc::clone(v.insert(Arc::new(Logger::new(name)))),
        };

        logger.set_parent(self.nearest_ancestor(name));
        self.adopt_descendants(&logger);
        Ok(logger)
    }

    /// Closest registered logger whose name is a dotted prefix of `name`
    fn nearest_ancestor(&self, name: &str) -> Option<Arc<Logger>> {
        let mut current = name;
        while let Some((prefix, _)) = current.rsplit_once('.') {
            if let Some(ancestor) = self.state.loggers.get(prefix) {
                return Some(Arc::clone(ancestor));
            }
            current = prefix;
        }
        None
    }

    /// Re-point descendants of a newly registered logger whose parent was a
    /// more distant ancestor (or missing)
    fn adopt_descendants(&self, logger: &Arc<Logger>) {
        let prefix = format!("{}.", logger.name());
        for (name, candidate) in self.state.loggers.iter() {
            if !name.starts_with(&prefix) {
                continue;
            }
            let closer = match candidate.parent() {
                None => true,
                Some(parent) => parent.name().len() < logger.name().len(),
            };
            if closer {
                candidate.set_parent(Some(Arc::clone(logger)));
            }
        }
    }
}
