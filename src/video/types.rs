//! Video source types and data structures.

use std::fmt;

/// A decoded source frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel data in RGB format, row-major, 3 bytes per pixel
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Metadata a source reports before any frame is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frames per second, rounded to an integer.
    pub fps: u32,
    /// Total number of frames the source expects to yield.
    pub frame_count: u64,
}

impl fmt::Display for VideoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {} fps, {} frames",
            self.width, self.height, self.fps, self.frame_count
        )
    }
}

/// Errors that can occur while probing or decoding a source video.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("ffmpeg/ffprobe not found on PATH")]
    FfmpegNotFound,

    #[error("failed to probe '{path}': {message}")]
    Probe { path: String, message: String },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
