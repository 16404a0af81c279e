//! Core logger types and traits

pub mod encoding;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod registry;
pub mod sink;

pub use encoding::Encoding;
pub use error::{LoggerError, Result};
pub use formatter::{
    Formatter, RecordFormatter, SharedFormatter, DEFAULT_PATTERN, FILE_TIMESTAMP_FORMAT,
    STREAM_TIMESTAMP_FORMAT,
};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use registry::{LoggerRegistry, RegistryGuard};
pub use sink::Sink;
