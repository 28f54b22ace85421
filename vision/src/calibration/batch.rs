//! Calibration batch entry point: image folder in, persisted intrinsics out.

use crate::common::constants::calibration::{IMAGE_EXTENSIONS, MIN_SAMPLES};
use logging::Logger;
use opencv::core::{Mat, Size};
use opencv::imgcodecs::{self, IMREAD_COLOR};
use opencv::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use thiserror::Error;

use super::extractor::CalibrationSampleExtractor;
use super::pattern::PatternGeometry;
use super::solver::{CalibrationReport, CalibrationSolver};
use super::store::CalibrationStore;

/// Reasons a batch produced no calibration. Nothing is persisted in any of them.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Insufficient images found: {found} of at least {required}")]
    InsufficientImages { found: usize, required: usize },
    #[error("Insufficient corners detected: pattern found in {detected} images, at least {required} required")]
    InsufficientCorners { detected: usize, required: usize },
    #[error("Solver failed: {0}")]
    SolverFailed(String),
    #[error("Could not save calibration: {0}")]
    Persistence(String),
}

/// Successful batch result
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub calibration: CalibrationReport,
    /// Candidate image files found in the folder
    pub images_scanned: usize,
    /// Images in which the pattern was detected
    pub samples_accepted: usize,
    pub output_dir: PathBuf,
}

/// Extract → solve → persist over one folder of candidate images
pub struct CalibrationBatch {
    extractor: CalibrationSampleExtractor,
    solver: CalibrationSolver,
    store: CalibrationStore,
    logger: Logger,
}

impl CalibrationBatch {
    pub fn new(
        pattern: PatternGeometry,
        solver: CalibrationSolver,
        store: CalibrationStore,
        logger: Logger,
    ) -> Self {
        CalibrationBatch {
            extractor: CalibrationSampleExtractor::new(pattern),
            solver,
            store,
            logger,
        }
    }

    pub fn run(&self, images_dir: &Path) -> Result<BatchReport, BatchError> {
        let paths = scan_images(images_dir);
        self.logger.info(&format!(
            "Calibrating from {} candidate image(s) in {}",
            paths.len(),
            images_dir.display()
        ));

        if paths.len() < MIN_SAMPLES {
            return Err(BatchError::InsufficientImages {
                found: paths.len(),
                required: MIN_SAMPLES,
            });
        }

        let mut samples = Vec::with_capacity(paths.len());
        let mut image_size: Option<Size> = None;

        for path in &paths {
            let Some(image) = read_image(path) else {
                self.logger
                    .warn(&format!("Skipping unreadable image {}", path.display()));
                continue;
            };

            let size = Size::new(image.cols(), image.rows());
            if *image_size.get_or_insert(size) != size {
                self.logger.warn(&format!(
                    "Skipping {}: size {}x{} differs from batch size",
                    path.display(),
                    size.width,
                    size.height
                ));
                continue;
            }

            match self.extractor.extract(&image) {
                Some(sample) => {
                    self.logger
                        .debug(&format!("Pattern found in {}", path.display()));
                    samples.push(sample);
                }
                None => {
                    self.logger
                        .info(&format!("Pattern not found in {}", path.display()));
                }
            }
        }

        self.logger.info(&format!(
            "Pattern detected in {} of {} image(s)",
            samples.len(),
            paths.len()
        ));

        if samples.len() < MIN_SAMPLES {
            return Err(BatchError::InsufficientCorners {
                detected: samples.len(),
                required: MIN_SAMPLES,
            });
        }

        let image_size = image_size.unwrap_or_default();
        let calibration = self
            .solver
            .solve(&samples, self.extractor.pattern(), image_size)
            .map_err(|e| BatchError::SolverFailed(e.to_string()))?;

        self.logger.info(&format!(
            "Calibration solved, reprojection error {:.4} px",
            calibration.rms_error
        ));

        self.store
            .save(&calibration.intrinsics)
            .map_err(|e| BatchError::Persistence(e.to_string()))?;

        Ok(BatchReport {
            calibration,
            images_scanned: paths.len(),
            samples_accepted: samples.len(),
            output_dir: self.store.dir().to_path_buf(),
        })
    }

    /// Runs the batch on a named worker thread
    pub fn spawn(self, images_dir: PathBuf) -> std::io::Result<JoinHandle<Result<BatchReport, BatchError>>> {
        thread::Builder::new()
            .name("calibration".to_string())
            .spawn(move || self.run(&images_dir))
    }
}

/// Candidate images in `dir`, sorted by path; an unreadable folder yields none
pub fn scan_images(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    paths.sort();
    paths
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

fn read_image(path: &Path) -> Option<Mat> {
    let image = imgcodecs::imread(path.to_str()?, IMREAD_COLOR).ok()?;
    (!image.empty()).then_some(image)
}
