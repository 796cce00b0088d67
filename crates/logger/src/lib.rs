//! Structured logging adapter with console and rotating-file sinks
//!
//! This crate provides the logging adapter used by servicebase services:
//! - Severity filtering against a configured minimum level
//! - Pipe-delimited record formatting with identifying metadata
//! - Console and rotating-file sinks with independent enable flags
//! - A per-instance background scheduler that rotates the log file daily
//! - Graceful shutdown that stops the scheduler and releases the file handle

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod adapter;
mod config;
mod error;
mod format;
mod level;
mod macros;
mod rotation;
mod writer;

pub use adapter::{LogAdapter, ScopedLogAdapter};
pub use config::{AppIdentity, LogConfig, LogConfigBuilder};
pub use error::{Error, Result};
pub use level::Level;
pub use rotation::RotationErrorHandler;
