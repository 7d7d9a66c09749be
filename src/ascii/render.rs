//! Whole-frame rendering: RGB frame in, fixed-width ASCII frame out.

use super::charset::Palette;
use super::dimensions::target_height;
use super::downsample::downsample;
use super::grayscale::to_grayscale_into;
use super::mapping::{layout_rows, map_to_glyphs};
use crate::video::RawFrame;

/// Default number of columns in a rendered frame.
pub const DEFAULT_TARGET_WIDTH: u32 = 240;

/// One rendered frame: rows of glyphs joined by `'\n'`, no trailing newline.
pub type AsciiFrame = String;

/// Errors raised while rendering a single frame.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("target width must be at least 1 column")]
    InvalidWidth,

    #[error("malformed frame: {width}x{height} RGB needs {expected} bytes, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Renders RGB frames into ASCII art at a fixed column count.
///
/// Holds a grayscale scratch buffer so a render job can push thousands of
/// frames through one renderer without reallocating it each time.
#[derive(Debug)]
pub struct FrameRenderer {
    target_width: u32,
    palette: Palette,
    invert: bool,
    gray: Vec<u8>,
}

impl FrameRenderer {
    /// Create a renderer with the classic palette.
    ///
    /// # Errors
    /// * `RenderError::InvalidWidth` - If `target_width` is 0
    pub fn new(target_width: u32) -> Result<Self, RenderError> {
        Self::with_palette(target_width, Palette::default(), false)
    }

    /// Create a renderer with an explicit palette and inversion setting.
    pub fn with_palette(
        target_width: u32,
        palette: Palette,
        invert: bool,
    ) -> Result<Self, RenderError> {
        if target_width == 0 {
            return Err(RenderError::InvalidWidth);
        }
        Ok(Self {
            target_width,
            palette,
            invert,
            gray: Vec::new(),
        })
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Number of rows a frame of the given source size renders to.
    pub fn rows_for(&self, source_width: u32, source_height: u32) -> u32 {
        target_height(source_width, source_height, self.target_width)
    }

    /// Render one frame.
    ///
    /// The output holds exactly `target_width * rows` glyphs plus `rows - 1`
    /// line breaks.
    ///
    /// # Errors
    /// * `RenderError::MalformedFrame` - If the sample buffer doesn't match the
    ///   frame's dimensions, or a dimension is 0
    pub fn render(&mut self, frame: &RawFrame) -> Result<AsciiFrame, RenderError> {
        let expected = frame.pixel_count() * 3;
        if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
            return Err(RenderError::MalformedFrame {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            });
        }

        to_grayscale_into(frame, &mut self.gray);

        let rows = self.rows_for(frame.width, frame.height);
        let cells = downsample(&self.gray, frame.width, frame.height, self.target_width, rows)
            .ok_or(RenderError::MalformedFrame {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            })?;

        let glyphs = map_to_glyphs(&cells, self.palette.glyphs(), self.invert);
        Ok(layout_rows(&glyphs, self.target_width as usize))
    }
}
