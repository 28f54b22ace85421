//! Frame processing for the arm's work area: perspective crop of the table
//! region, green segmentation and contour detection.

pub mod contours;
pub mod perspective;
pub mod segmentation;

pub use contours::{ContourOptions, ContourReport, DetectedContour, annotate, detect_contours};
pub use perspective::{Quad, perspective_crop};
pub use segmentation::{HsvRange, segment, segment_green};

use crate::error::Result;
use crate::video::VideoFrame;
use std::fmt;
use std::str::FromStr;

/// What [`FrameProcessor::process`] produces after the optional crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Cropped frame only
    Crop,
    /// Single-channel mask of the HSV range
    Segment,
    /// Frame annotated with detected outlines
    #[default]
    Contours,
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingMode::Crop => "crop",
            ProcessingMode::Segment => "segment",
            ProcessingMode::Contours => "contours",
        };
        f.write_str(name)
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crop" => Ok(ProcessingMode::Crop),
            "segment" => Ok(ProcessingMode::Segment),
            "contours" => Ok(ProcessingMode::Contours),
            other => Err(format!(
                "Unknown processing mode '{}' (expected crop, segment or contours)",
                other
            )),
        }
    }
}

/// Result of one processed frame
#[derive(Debug)]
pub struct ProcessedFrame {
    pub frame: VideoFrame,
    /// Present in [`ProcessingMode::Contours`]
    pub contours: Option<ContourReport>,
}

/// Crop then segment or outline, frame by frame
#[derive(Debug, Clone, Default)]
pub struct FrameProcessor {
    crop: Option<Quad>,
    mode: ProcessingMode,
    range: HsvRange,
    options: ContourOptions,
}

impl FrameProcessor {
    pub fn new(mode: ProcessingMode) -> Self {
        FrameProcessor {
            mode,
            ..Self::default()
        }
    }

    pub fn with_crop(mut self, quad: Quad) -> Self {
        self.crop = Some(quad);
        self
    }

    pub fn with_range(mut self, range: HsvRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_contour_options(mut self, options: ContourOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Processes `frame`; the output keeps its sequence number and timestamp
    pub fn process(&self, frame: &VideoFrame) -> Result<ProcessedFrame> {
        let region = match &self.crop {
            Some(quad) => perspective_crop(frame.data(), quad)?,
            None => frame.data().try_clone()?,
        };

        let (mat, contours) = match self.mode {
            ProcessingMode::Crop => (region, None),
            ProcessingMode::Segment => (segment(&region, &self.range)?, None),
            ProcessingMode::Contours => {
                let report = detect_contours(&region, &self.options)?;
                (annotate(&region, &report)?, Some(report))
            }
        };

        Ok(ProcessedFrame {
            frame: frame.derive(mat),
            contours,
        })
    }
}
