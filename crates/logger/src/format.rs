//! Record formatting
//!
//! A record is one pipe-delimited line:
//! `timestamp|[contextId]|hostname|level|loggerName|appName|msName|requestId|message`

use crate::config::AppIdentity;
use crate::level::Level;
use chrono::{Local, Timelike};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Logger name embedded in every record.
const LOGGER_NAME: &str = "application-log";

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Numeric id of the calling thread, assigned on first use.
    static CONTEXT_ID: u64 = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
}

fn context_id() -> u64 {
    CONTEXT_ID.with(|id| *id)
}

/// Builds the pipe-delimited record lines for one adapter instance.
///
/// Embedded `|` characters in the message are not escaped; a record stays
/// parseable only as long as the message carries no delimiter.
#[derive(Debug)]
pub(crate) struct Formatter {
    hostname: String,
    app_name: String,
    ms_name: String,
}

impl Formatter {
    /// Resolves the hostname and captures the application identity.
    ///
    /// Hostname resolution failure is reported and an empty placeholder is
    /// used; formatting never fails because of it.
    pub(crate) fn new(identity: &AppIdentity) -> Self {
        let hostname = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve hostname for log records");
                String::new()
            }
        };

        Self {
            hostname,
            app_name: identity.app_name.clone(),
            ms_name: identity.ms_name.clone(),
        }
    }

    /// Formats a record with a fresh random request id.
    pub(crate) fn format(&self, level: Level, message: &str) -> String {
        self.format_with_request_id(level, message, &Uuid::new_v4().to_string())
    }

    /// Formats a record carrying the supplied correlation id.
    pub(crate) fn format_with_request_id(
        &self,
        level: Level,
        message: &str,
        request_id: &str,
    ) -> String {
        format!(
            "{}|[{}]|{}|{}|{}|{}|{}|{}|{}",
            timestamp(),
            context_id(),
            self.hostname,
            level,
            LOGGER_NAME,
            self.app_name,
            self.ms_name,
            request_id,
            message
        )
    }
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS.ffff`.
fn timestamp() -> String {
    let now = Local::now();
    // chrono has no four-digit fraction specifier; leap-second nanoseconds
    // exceed the usual range, hence the clamp.
    let frac = (now.nanosecond() / 100_000).min(9_999);
    format!("{}.{frac:04}", now.format("%Y-%m-%d %H:%M:%S"))
}
