//! Logging macros for ergonomic log message formatting.
//!
//! These macros accept `format!` arguments and skip the formatting entirely
//! when the logger would discard the record.
//!
//! # Examples
//!
//! ```
//! use logger_factory::prelude::*;
//! use logger_factory::info;
//!
//! let registry = LoggerRegistry::new();
//! let logger = registry.get_or_create("server").unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use logger_factory::prelude::*;
/// # let logger = LoggerRegistry::new().get_or_create("app").unwrap();
/// use logger_factory::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled_for(level) {
            $logger.log(level, format!($($arg)+));
        } else {
            $logger.metrics().record_filtered();
        }
    }};
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use logger_factory::prelude::*;
/// # let logger = LoggerRegistry::new().get_or_create("app").unwrap();
/// use logger_factory::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use logger_factory::prelude::*;
/// # let logger = LoggerRegistry::new().get_or_create("app").unwrap();
/// use logger_factory::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
