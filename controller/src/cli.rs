//! Command-line surface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vision::{ProcessingMode, PropertyId, Quad};

#[derive(Debug, Parser)]
#[command(author, version, about = "Robot arm camera controller")]
pub struct Cli {
    /// Configuration file (defaults to the usual controller_config.json lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream from a camera without a display, logging every notification
    Stream(StreamArgs),
    /// Calibrate from a folder of checkerboard images
    Calibrate(CalibrateArgs),
    /// List usable capture devices
    Devices,
    /// Save one corrected frame as the next calibration image
    Snapshot(SnapshotArgs),
    /// Crop, segment or outline objects in a saved image
    Process(ProcessArgs),
}

#[derive(Debug, Args)]
pub struct StreamArgs {
    #[arg(short, long)]
    pub device: Option<i32>,

    #[arg(long, requires = "height")]
    pub width: Option<i32>,

    #[arg(long, requires = "width")]
    pub height: Option<i32>,

    /// How long to stream
    #[arg(short, long, default_value_t = 5)]
    pub seconds: u64,

    /// Property write applied once the device is open, e.g. `brightness=200`
    #[arg(long = "set", value_parser = parse_property_setting)]
    pub settings: Vec<(PropertyId, i32)>,

    /// Write the last received frame here when streaming ends
    #[arg(long)]
    pub save_last: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CalibrateArgs {
    /// Folder of checkerboard images
    #[arg(short, long)]
    pub images: Option<PathBuf>,

    /// Folder receiving the calibration documents
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inner corners per row
    #[arg(long, requires = "rows")]
    pub columns: Option<i32>,

    /// Inner corners per column
    #[arg(long, requires = "columns")]
    pub rows: Option<i32>,

    /// Checkerboard square side length
    #[arg(long)]
    pub square: Option<f32>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[arg(short, long)]
    pub device: Option<i32>,

    /// Target folder (defaults to the calibration images folder)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Image to process
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the result
    #[arg(short, long)]
    pub output: PathBuf,

    /// crop, segment or contours
    #[arg(short, long, default_value_t = ProcessingMode::Contours)]
    pub mode: ProcessingMode,

    /// Region to straighten first: x,y for top-left, top-right, bottom-right, bottom-left
    #[arg(long, allow_hyphen_values = true)]
    pub crop: Option<Quad>,
}

/// Parses `name=value` into a property write
pub fn parse_property_setting(s: &str) -> Result<(PropertyId, i32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected property=value, got '{}'", s))?;

    let property = name.parse::<PropertyId>()?;
    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("Invalid value for {}: {}", property, e))?;

    Ok((property, value))
}
