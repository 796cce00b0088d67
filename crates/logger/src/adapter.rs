//! The logging adapter tying filter, formatter, sinks and rotation together

use crate::config::{AppIdentity, LogConfig};
use crate::error::Result;
use crate::format::Formatter;
use crate::level::Level;
use crate::rotation::{DAILY, ErrorReporter, RotationErrorHandler, RotationScheduler};
use crate::writer::RotatingFileWriter;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Structured logging adapter writing pipe-delimited records to standard
/// output and/or a rotating log file.
///
/// One instance owns at most one file handle and one rotation scheduler;
/// instances share no state. The level methods are best-effort: sink
/// failures are reported through `tracing` and never propagate to the
/// caller.
pub struct LogAdapter {
    min_level: Level,
    console: bool,
    formatter: Formatter,
    writer: Option<Arc<Mutex<RotatingFileWriter>>>,
    scheduler: Option<RotationScheduler>,
    reporter: Arc<ErrorReporter>,
}

impl LogAdapter {
    /// Creates an adapter from the host configuration and identity.
    ///
    /// With the file sink enabled this opens the active log file under
    /// `config.directory` and starts the daily rotation scheduler; failing
    /// either aborts construction. Without it no file handle is ever
    /// created.
    pub fn new(config: LogConfig, identity: AppIdentity) -> Result<Self> {
        let formatter = Formatter::new(&identity);
        let reporter = Arc::new(ErrorReporter::default());

        let (writer, scheduler) = if config.file {
            let writer = Arc::new(Mutex::new(RotatingFileWriter::open(&config)?));
            let scheduler = RotationScheduler::start(DAILY, writer.clone(), reporter.clone())?;
            (Some(writer), Some(scheduler))
        } else {
            (None, None)
        };

        Ok(Self {
            min_level: config.level,
            console: config.console,
            formatter,
            writer,
            scheduler,
            reporter,
        })
    }

    /// Logs a message at [`Level::Error`].
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message.as_ref());
    }

    /// Logs a message at [`Level::Warn`].
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message.as_ref());
    }

    /// Logs a message at [`Level::Info`].
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message.as_ref());
    }

    /// Logs a message at [`Level::Debug`].
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message.as_ref());
    }

    /// Returns a view whose records carry `request_id` in place of the
    /// per-record random id, for correlating all records of one request.
    pub fn scoped(&self, request_id: impl Into<String>) -> ScopedLogAdapter<'_> {
        ScopedLogAdapter {
            adapter: self,
            request_id: request_id.into(),
        }
    }

    /// Rotates the log file immediately, independent of the daily cadence.
    ///
    /// A no-op for adapters without a file sink.
    pub fn rotate(&self) -> Result<()> {
        match &self.writer {
            Some(writer) => writer.lock().rotate(),
            None => Ok(()),
        }
    }

    /// Installs a callback invoked whenever a scheduled rotation fails, so
    /// the owning process can alert on it.
    pub fn set_rotation_error_handler(&self, handler: RotationErrorHandler) {
        self.reporter.set_handler(handler);
    }

    /// Shuts the adapter down: stops the rotation scheduler, then flushes
    /// and closes the file handle, in that order.
    ///
    /// Safe to call more than once and a no-op for console-only adapters.
    /// Records logged afterwards are dropped by the file sink; the console
    /// sink is unaffected.
    pub fn shutdown(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        if let Some(writer) = self.writer.take() {
            writer.lock().close();
        }
    }

    fn log(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        self.emit(&self.formatter.format(level, message));
    }

    fn emit(&self, line: &str) {
        if self.console {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(line.as_bytes());
            let _ = stdout.write_all(b"\n");
            let _ = stdout.flush();
        }

        if let Some(writer) = &self.writer {
            if let Err(e) = writer.lock().write_line(line) {
                tracing::error!(error = %e, "failed to write log record to file");
            }
        }
    }
}

/// A correlation-scoped view over a [`LogAdapter`].
///
/// Produced by [`LogAdapter::scoped`]; every record formatted through it
/// carries the supplied request id.
pub struct ScopedLogAdapter<'a> {
    adapter: &'a LogAdapter,
    request_id: String,
}

impl ScopedLogAdapter<'_> {
    /// Logs a message at [`Level::Error`].
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message.as_ref());
    }

    /// Logs a message at [`Level::Warn`].
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message.as_ref());
    }

    /// Logs a message at [`Level::Info`].
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message.as_ref());
    }

    /// Logs a message at [`Level::Debug`].
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message.as_ref());
    }

    fn log(&self, level: Level, message: &str) {
        if level < self.adapter.min_level {
            return;
        }
        let line = self
            .adapter
            .formatter
            .format_with_request_id(level, message, &self.request_id);
        self.adapter.emit(&line);
    }
}
