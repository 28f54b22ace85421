//! Offline frame processing of a saved image

use logging::Logger;
use vision::calibration::{read_frame, write_frame};
use vision::FrameProcessor;
use vision::processing::ContourReport;

use super::CommandResult;
use crate::cli::ProcessArgs;

pub fn run(args: ProcessArgs, logger: &Logger) -> CommandResult {
    let mut processor = FrameProcessor::new(args.mode);
    if let Some(quad) = args.crop {
        processor = processor.with_crop(quad);
    }

    let frame = read_frame(&args.input)?;
    logger.info(&format!(
        "Processing {} ({}x{}) in {} mode",
        args.input.display(),
        frame.width(),
        frame.height(),
        processor.mode()
    ));

    let processed = processor.process(&frame)?;
    write_frame(&args.output, &processed.frame)?;
    logger.info(&format!("Result written to {}", args.output.display()));

    if let Some(report) = &processed.contours {
        print!("{}", describe(report));
    }
    println!("{}", args.output.display());
    Ok(())
}

/// One line per outline, the largest flagged
fn describe(report: &ContourReport) -> String {
    let mut text = String::new();
    for (index, contour) in report.contours.iter().enumerate() {
        let b = contour.bounding_box;
        let centre = contour
            .centroid
            .map(|c| format!("({}, {})", c.x, c.y))
            .unwrap_or_else(|| "-".to_string());
        let marker = if report.largest == Some(index) { " *" } else { "" };
        text.push_str(&format!(
            "{}x{} at ({}, {}) area {:.0} centre {}{}\n",
            b.width, b.height, b.x, b.y, contour.area, centre, marker
        ));
    }
    text
}
