//! Subcommand implementations

pub mod calibrate;
pub mod devices;
pub mod process;
pub mod snapshot;
pub mod stream;

use std::error::Error;

pub type CommandResult = Result<(), Box<dyn Error>>;
