//! Thread-safe asynchronous logger.
//!
//! The [`Logger`] handle formats nothing itself: it stamps a record and hands it
//! to the writer thread, so callers never block on I/O.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::{LogTarget, spawn_writer_thread};
use std::path::PathBuf;
use std::sync::mpsc::{Sender, channel};

/// Thread-safe, non-blocking logger.
///
/// Clones and component loggers share one channel to a single writer thread.
///
/// # Examples
///
/// ```
/// use logging::{Logger, LogLevel};
///
/// let logger = Logger::discard();
/// let engine = logger.for_component("engine");
/// engine.info("Capture thread started");
/// assert_eq!(logger.level(), LogLevel::Error);
/// ```
#[derive(Clone)]
pub struct Logger {
    sender: Option<Sender<LogMessage>>,
    level: LogLevel,
    component: Option<String>,
}

impl Logger {
    /// Creates a logger appending to `log_path`.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        Self::with_target(LogTarget::File(log_path), level)
    }

    /// Creates a logger writing to stderr only.
    ///
    /// # Errors
    ///
    /// Returns error if the writer thread cannot be spawned.
    pub fn console(level: LogLevel) -> Result<Self> {
        Self::with_target(LogTarget::Console, level)
    }

    /// Creates a logger for an arbitrary [`LogTarget`].
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened or the writer thread
    /// cannot be spawned.
    pub fn with_target(target: LogTarget, level: LogLevel) -> Result<Self> {
        let (sender, receiver) = channel();
        let sender = spawn_writer_thread(&target, receiver)?.then_some(sender);
        Ok(Logger {
            sender,
            level,
            component: None,
        })
    }

    /// A logger that records nothing.
    pub fn discard() -> Self {
        Logger {
            sender: None,
            level: LogLevel::Error,
            component: None,
        }
    }

    /// Returns a handle tagged with `component` that shares this logger's writer.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sender: self.sender.clone(),
            level: self.level,
            component: Some(component.to_string()),
        }
    }

    /// Minimum level this handle records.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Stamps and forwards one record; a closed writer drops it silently
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.level {
            return;
        }
        if let Some(sender) = self.sender.as_ref() {
            let msg = LogMessage::new(level, self.component.as_deref(), message.to_string());
            let _ = sender.send(msg);
        }
    }
}
