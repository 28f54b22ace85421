//! Dedicated writer thread behind every logger handle.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// Where log records end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file (created if missing).
    File(PathBuf),
    /// Write to stderr.
    Console,
    /// Append to a file and echo to stderr.
    FileAndConsole(PathBuf),
    /// Drop every record (tests, benchmarks).
    Discard,
}

impl LogTarget {
    fn file_path(&self) -> Option<&PathBuf> {
        match self {
            LogTarget::File(path) | LogTarget::FileAndConsole(path) => Some(path),
            LogTarget::Console | LogTarget::Discard => None,
        }
    }

    fn echoes_to_console(&self) -> bool {
        matches!(self, LogTarget::Console | LogTarget::FileAndConsole(_))
    }
}

pub(crate) struct LogWriter {
    file: Option<File>,
    console: bool,
}

impl LogWriter {
    /// Opens the file side of the target eagerly so configuration errors surface at startup.
    pub fn new(target: &LogTarget) -> Result<Self> {
        let file = match target.file_path() {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };

        Ok(Self {
            file,
            console: target.echoes_to_console(),
        })
    }

    fn write_message(&mut self, message: &LogMessage) {
        let line = message.format();

        if self.console {
            let _ = io::stderr().write_all(line.as_bytes());
        }

        if let Some(file) = self.file.as_mut()
            && let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush())
        {
            eprintln!("Error writing log: {}", e);
        }
    }

    /// Drains the channel until every sender is gone.
    pub fn run(mut self, receiver: Receiver<LogMessage>) {
        for message in receiver {
            self.write_message(&message);
        }
    }
}

/// Spawns the writer thread. Returns `Ok(false)` when nothing needs writing.
pub(crate) fn spawn_writer_thread(target: &LogTarget, receiver: Receiver<LogMessage>) -> Result<bool> {
    if *target == LogTarget::Discard {
        return Ok(false);
    }

    let writer = LogWriter::new(target)?;
    std::thread::Builder::new()
        .name("log-writer".to_string())
        .spawn(move || writer.run(receiver))
        .map_err(|e| LoggingError::Writer(e.to_string()))?;
    Ok(true)
}
