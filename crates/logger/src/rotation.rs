//! Background rotation scheduling

use crate::error::Error;
use crate::writer::RotatingFileWriter;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cadence of scheduled rotation: once every 24 hours.
pub(crate) const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

/// Callback invoked when a scheduled rotation fails.
pub type RotationErrorHandler = Box<dyn Fn(&Error) + Send + Sync>;

/// Reports rotation failures through the diagnostics stream and, when
/// installed, an injected handler. The owning process decides severity; a
/// failed rotation never aborts anything.
#[derive(Default)]
pub(crate) struct ErrorReporter {
    handler: Mutex<Option<RotationErrorHandler>>,
}

impl ErrorReporter {
    pub(crate) fn set_handler(&self, handler: RotationErrorHandler) {
        *self.handler.lock() = Some(handler);
    }

    pub(crate) fn report(&self, error: &Error) {
        tracing::error!(error = %error, "scheduled log rotation failed");
        if let Some(handler) = self.handler.lock().as_ref() {
            handler(error);
        }
    }
}

/// Background timer firing rotation of the shared file sink on a fixed
/// cadence.
///
/// Owned by one adapter instance. [`stop`](Self::stop) halts future firings
/// deterministically; an in-flight firing is allowed to complete before
/// `stop` returns.
pub(crate) struct RotationScheduler {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RotationScheduler {
    /// Spawns the worker; the job is registered and running once this
    /// returns.
    pub(crate) fn start(
        interval: Duration,
        writer: Arc<Mutex<RotatingFileWriter>>,
        reporter: Arc<ErrorReporter>,
    ) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("log-rotation".into())
            .spawn(move || {
                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let result = writer.lock().rotate();
                            if let Err(e) = result {
                                reporter.report(&e);
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        Ok(Self {
            shutdown_tx,
            handle: Some(handle),
        })
    }

    /// Stops future firings and waits for the worker to exit. Safe to call
    /// more than once.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown_tx.send(());
            let _ = handle.join();
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
