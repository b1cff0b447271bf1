//! Diagnostic sink for send progress.
//!
//! A [`Mailer`](crate::Mailer) reports every step of composing and sending
//! through a [`Diagnostics`] implementation handed to it at construction.
//! Four severities exist; `critical` marks failures that make any retry
//! pointless without operator action (bad credentials, unreachable server).
//!
//! # Example
//!
//! ```ignore
//! use mailstaff::diagnostics::{CollectingDiagnostics, Level};
//!
//! let sink = Arc::new(CollectingDiagnostics::new());
//! let mailer = Mailer::new(config, sink.clone());
//! mailer.send_ok(&request).await;
//! assert!(sink.events().iter().all(|e| e.level != Level::Critical));
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Progress information.
    Info,
    /// Something was skipped but the send continues.
    Warn,
    /// The send failed.
    Error,
    /// The send failed in a way that needs operator attention.
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        })
    }
}

/// Receiver for diagnostic events.
///
/// All methods default to doing nothing.
pub trait Diagnostics: Send + Sync {
    /// Called for progress messages.
    fn info(&self, message: &str) {
        let _ = message;
    }

    /// Called when a step is skipped.
    fn warn(&self, message: &str) {
        let _ = message;
    }

    /// Called when a send fails.
    fn error(&self, message: &str) {
        let _ = message;
    }

    /// Called when a send fails on authentication or connection.
    fn critical(&self, message: &str) {
        let _ = message;
    }

    /// Dispatches to the method for `level`.
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Info => self.info(message),
            Level::Warn => self.warn(message),
            Level::Error => self.error(message),
            Level::Critical => self.critical(message),
        }
    }
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// A sink that forwards events to `tracing`.
///
/// `tracing` has no critical level; critical events are emitted at `ERROR`
/// with a `critical = true` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn critical(&self, message: &str) {
        tracing::error!(critical = true, "{message}");
    }
}

/// One recorded diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// A sink that collects events in memory.
///
/// Useful for testing or for presenting a send log after the fact.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Event>>,
}

impl CollectingDiagnostics {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Takes all collected events, leaving the collector empty.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the messages recorded at `level`.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .map(|event| event.message)
            .collect()
    }

    fn record(&self, level: Level, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Event {
                level,
                message: message.to_string(),
            });
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn critical(&self, message: &str) {
        self.record(Level::Critical, message);
    }
}
