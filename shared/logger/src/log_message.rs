//! Internal log record.

use crate::log_level::LogLevel;
use chrono::Local;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One log record, stamped on the calling thread before it is queued.
#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub thread: String,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    /// Creates a record stamped with the current time and calling thread.
    pub fn new(level: LogLevel, component: Option<&str>, message: String) -> Self {
        let current = std::thread::current();
        let thread = current.name().unwrap_or("unnamed").to_string();

        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            level,
            thread,
            component: component.map(str::to_string),
            message,
        }
    }

    /// Formats as `[timestamp] LEVEL (thread) [component]: message\n`.
    pub fn format(&self) -> String {
        match self.component {
            Some(ref component) => format!(
                "[{}] {} ({}) [{}]: {}\n",
                self.timestamp,
                self.level.as_str(),
                self.thread,
                component,
                self.message
            ),
            None => format!(
                "[{}] {} ({}): {}\n",
                self.timestamp,
                self.level.as_str(),
                self.thread,
                self.message
            ),
        }
    }
}
