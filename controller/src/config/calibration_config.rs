use serde::{Deserialize, Serialize};
use vision::{CalibrationSolver, PatternGeometry, Result};

/// Checkerboard and folder layout for calibration runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub images_dir: String,
    pub output_dir: String,
    /// Inner corners per row
    pub board_columns: i32,
    /// Inner corners per column
    pub board_rows: i32,
    pub square_size: f32,
    pub alpha: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            images_dir: "images/calibration".to_string(),
            output_dir: "calibration".to_string(),
            board_columns: 9,
            board_rows: 6,
            square_size: 10.0,
            alpha: 1.0,
        }
    }
}

impl CalibrationConfig {
    pub fn pattern(&self) -> Result<PatternGeometry> {
        PatternGeometry::new(self.board_columns, self.board_rows, self.square_size)
    }

    pub fn solver(&self) -> Result<CalibrationSolver> {
        CalibrationSolver::new(self.alpha)
    }
}
