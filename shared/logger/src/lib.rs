//! Asynchronous logging shared by the capture library and the controller.
//!
//! Records are stamped on the calling thread (time, level, thread name,
//! component) and written by a single background thread, so the capture
//! loop can log without touching the disk.

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use log_writer::LogTarget;
pub use logger::Logger;
