//! Video frame representation.
//!
//! `VideoFrame` is the unit published by the capture engine: an owned pixel
//! buffer tagged with its dimensions, pixel layout and capture metadata.

use crate::error::Result;
use opencv::core::{CV_8UC1, CV_8UC3, CV_8UC4, Mat};
use opencv::prelude::*;
use std::time::Instant;

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 8-bit, 3 channels, blue-green-red (camera default)
    Bgr8,
    /// 8-bit, 4 channels
    Bgra8,
    /// 8-bit, single channel
    Gray8,
    /// Any other OpenCV matrix type
    Other(i32),
}

impl PixelLayout {
    /// Derives the layout from an OpenCV matrix type code
    pub fn from_mat_type(typ: i32) -> Self {
        match typ {
            t if t == CV_8UC3 => PixelLayout::Bgr8,
            t if t == CV_8UC4 => PixelLayout::Bgra8,
            t if t == CV_8UC1 => PixelLayout::Gray8,
            other => PixelLayout::Other(other),
        }
    }
}

/// Raw or corrected video frame
///
/// Wraps an OpenCV Mat with dimensions, layout, capture time and the
/// per-device sequence number assigned by the capture loop.
#[derive(Clone)]
pub struct VideoFrame {
    data: Mat,
    width: i32,
    height: i32,
    layout: PixelLayout,
    timestamp: Instant,
    sequence: u64,
}

impl VideoFrame {
    /// Creates a frame from an OpenCV Mat, stamped now with sequence 0
    pub fn new(mat: Mat) -> Self {
        let width = mat.cols();
        let height = mat.rows();
        let layout = PixelLayout::from_mat_type(mat.typ());

        VideoFrame {
            data: mat,
            width,
            height,
            layout,
            timestamp: Instant::now(),
            sequence: 0,
        }
    }

    /// Sets the sequence number
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Builds a frame around `mat` that keeps this frame's metadata.
    ///
    /// Used by processing stages whose output describes the same capture.
    pub fn derive(&self, mat: Mat) -> Self {
        VideoFrame {
            width: mat.cols(),
            height: mat.rows(),
            layout: PixelLayout::from_mat_type(mat.typ()),
            data: mat,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Returns an independent copy backed by its own pixel buffer
    pub fn deep_copy(&self) -> Result<Self> {
        Ok(self.derive(self.data.try_clone()?))
    }

    /// Frame width in pixels
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pixel layout of the buffer
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Capture timestamp
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Position of this frame in the stream of the device that produced it
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Reference to the internal OpenCV matrix
    pub fn data(&self) -> &Mat {
        &self.data
    }

    /// Mutable reference to the internal OpenCV matrix
    pub fn data_mut(&mut self) -> &mut Mat {
        &mut self.data
    }

    /// Consumes the frame and returns the internal Mat
    pub fn into_mat(self) -> Mat {
        self.data
    }
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("sequence", &self.sequence)
            .finish()
    }
}
