//! Saving live frames as calibration images (`image<N>.tif`).

use crate::error::{Result, VisionError};
use crate::video::frame::VideoFrame;
use opencv::core::Vector;
use opencv::imgcodecs;
use opencv::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const PREFIX: &str = "image";
const EXTENSION: &str = "tif";

/// Next free `image<N>.tif` in `dir`, where N is one past the highest existing number.
///
/// Creates `dir` if it does not exist.
pub fn next_snapshot_path(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let highest = fs::read_dir(dir)?
        .flatten()
        .filter_map(|e| snapshot_number(&e.file_name().to_string_lossy()))
        .max()
        .unwrap_or(0);

    let next = highest.checked_add(1).ok_or_else(|| {
        VisionError::Persistence(format!(
            "No snapshot number left after {}{}.{} in {}",
            PREFIX,
            highest,
            EXTENSION,
            dir.display()
        ))
    })?;

    Ok(dir.join(format!("{}{}.{}", PREFIX, next, EXTENSION)))
}

fn snapshot_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(PREFIX)?
        .strip_suffix(&format!(".{}", EXTENSION))?
        .parse()
        .ok()
}

/// Writes `frame` to the next snapshot path and returns that path
pub fn save_snapshot(dir: &Path, frame: &VideoFrame) -> Result<PathBuf> {
    let path = next_snapshot_path(dir)?;
    write_frame(&path, frame)?;
    Ok(path)
}

/// Encodes `frame` to `path`; the format follows the extension.
pub fn write_frame(path: &Path, frame: &VideoFrame) -> Result<()> {
    let name = path
        .to_str()
        .ok_or_else(|| VisionError::Persistence(format!("Non UTF-8 path {}", path.display())))?;

    if !imgcodecs::imwrite(name, frame.data(), &Vector::new())? {
        return Err(VisionError::Persistence(format!(
            "Failed to write image {}",
            path.display()
        )));
    }
    Ok(())
}

/// Decodes a colour image from `path`
pub fn read_frame(path: &Path) -> Result<VideoFrame> {
    let name = path
        .to_str()
        .ok_or_else(|| VisionError::Persistence(format!("Non UTF-8 path {}", path.display())))?;

    let image = imgcodecs::imread(name, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Err(VisionError::Persistence(format!(
            "Failed to read image {}",
            path.display()
        )));
    }
    Ok(VideoFrame::new(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{CV_8UC3, Mat, Scalar};
    use tempfile::tempdir;

    #[test]
    fn test_first_snapshot_in_new_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("images");

        let path = next_snapshot_path(&folder).unwrap();
        assert_eq!(path, folder.join("image1.tif"));
        assert!(folder.is_dir());
    }

    #[test]
    fn test_numbering_follows_highest() {
        let dir = tempdir().unwrap();
        for name in ["image7.tif", "image3.tif", "image12.png", "imageX.tif"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let path = next_snapshot_path(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("image8.tif"));
    }

    #[test]
    fn test_save_snapshot_writes_file() {
        let dir = tempdir().unwrap();
        let mat = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(90.0)).unwrap();
        let frame = VideoFrame::new(mat);

        let first = save_snapshot(dir.path(), &frame).unwrap();
        let second = save_snapshot(dir.path(), &frame).unwrap();

        assert!(first.ends_with("image1.tif"));
        assert!(second.ends_with("image2.tif"));
        assert!(second.exists());
    }

    #[test]
    fn test_numbering_exhausted_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(format!("image{}.tif", u32::MAX)), b"x").unwrap();

        assert!(matches!(
            next_snapshot_path(dir.path()),
            Err(VisionError::Persistence(_))
        ));
    }

    #[test]
    fn test_written_frame_reads_back() {
        let dir = tempdir().unwrap();
        let mat = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(90.0)).unwrap();
        let path = save_snapshot(dir.path(), &VideoFrame::new(mat)).unwrap();

        let frame = read_frame(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert!(read_frame(&dir.path().join("missing.png")).is_err());
    }
}
