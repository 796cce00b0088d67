//! Format-style logging macros
//!
//! Every level expands through the same path: format the arguments, then a
//! single call on the passed adapter. Extra arguments are threaded
//! identically for all four levels.

/// Logs a formatted message at error level.
#[macro_export]
macro_rules! log_error {
    ($adapter:expr, $($arg:tt)*) => {
        $adapter.error(format!($($arg)*))
    };
}

/// Logs a formatted message at warn level.
#[macro_export]
macro_rules! log_warn {
    ($adapter:expr, $($arg:tt)*) => {
        $adapter.warn(format!($($arg)*))
    };
}

/// Logs a formatted message at info level.
#[macro_export]
macro_rules! log_info {
    ($adapter:expr, $($arg:tt)*) => {
        $adapter.info(format!($($arg)*))
    };
}

/// Logs a formatted message at debug level.
#[macro_export]
macro_rules! log_debug {
    ($adapter:expr, $($arg:tt)*) => {
        $adapter.debug(format!($($arg)*))
    };
}
