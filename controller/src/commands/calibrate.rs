//! Batch calibration from an image folder

use logging::Logger;
use std::path::PathBuf;
use vision::{CalibrationBatch, CalibrationStore};

use super::CommandResult;
use crate::cli::CalibrateArgs;
use crate::config::{CalibrationConfig, ControllerConfig};

/// Command-line overrides applied on top of the configured board and folders
pub fn effective_config(args: &CalibrateArgs, config: &ControllerConfig) -> CalibrationConfig {
    let mut calibration = config.calibration.clone();
    if let Some(images) = &args.images {
        calibration.images_dir = images.display().to_string();
    }
    if let Some(output) = &args.output {
        calibration.output_dir = output.display().to_string();
    }
    if let (Some(columns), Some(rows)) = (args.columns, args.rows) {
        calibration.board_columns = columns;
        calibration.board_rows = rows;
    }
    if let Some(square) = args.square {
        calibration.square_size = square;
    }
    calibration
}

pub fn run(args: CalibrateArgs, config: &ControllerConfig, logger: &Logger) -> CommandResult {
    let calibration = effective_config(&args, config);
    let pattern = calibration.pattern()?;
    let calibration_logger = logger.for_component("calibration");

    let batch = CalibrationBatch::new(
        pattern,
        calibration.solver()?,
        CalibrationStore::new(&calibration.output_dir, calibration_logger.clone()),
        calibration_logger,
    );

    let images_dir = PathBuf::from(&calibration.images_dir);
    println!(
        "Calibrating from {} ({}x{} corners, square {})",
        images_dir.display(),
        pattern.columns(),
        pattern.rows(),
        pattern.square_size()
    );

    match batch.run(&images_dir) {
        Ok(report) => {
            println!(
                "RMS reprojection error: {:.4} px ({} of {} images used)",
                report.calibration.rms_error, report.samples_accepted, report.images_scanned
            );
            println!("Calibration written to {}", report.output_dir.display());
            Ok(())
        }
        Err(e) => {
            logger.error(&format!("Calibration failed: {}", e));
            Err(e.into())
        }
    }
}
