//! # Logger Factory
//!
//! Idempotent, thread-safe construction of named loggers that write every record
//! to three places at once: a general rotating log file, an `ERROR`-only rotating
//! log file, and the console.
//!
//! ## Features
//!
//! - **Idempotent**: asking for the same name twice never duplicates sinks
//! - **Thread Safe**: racing first callers still produce exactly one sink set
//! - **Daily Rotation**: files roll over at local midnight with bounded retention
//! - **Overridable Formatting**: per-factory defaults, per-logger overrides
//!
//! ```no_run
//! use logger_factory::prelude::*;
//!
//! let factory = LoggerFactory::new("logs/demo").unwrap();
//! let logger = factory.get_logger("demo", LogLevel::Debug).unwrap();
//! logger.info("Hello world!");
//! logger.critical("written to logs/demo.log and logs/demo.error.log");
//! ```

pub mod core;
pub mod factory;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Encoding, Formatter, LogLevel, LogRecord, Logger, LoggerError, LoggerMetrics,
        LoggerRegistry, RecordFormatter, Result, SharedFormatter, Sink,
    };
    pub use crate::factory::{FactoryConfig, LoggerFactory, LoggerFactoryBuilder, LoggerOptions};
    pub use crate::sinks::ConsoleTarget;
}

pub use crate::core::{
    Encoding, Formatter, LogLevel, LogRecord, Logger, LoggerError, LoggerMetrics, LoggerRegistry,
    RecordFormatter, Result, SharedFormatter, Sink,
};
pub use factory::{FactoryConfig, LoggerFactory, LoggerFactoryBuilder, LoggerOptions};
pub use sinks::{ConsoleSink, ConsoleTarget, RotatingFile, RotatingFileSink};
