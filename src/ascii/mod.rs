//! ASCII renderer module for converting video frames to ASCII art.
//!
//! This module provides the pipeline that turns one decoded RGB frame into
//! one fixed-width block of glyphs:
//!
//! 1. **Grayscale conversion** - RGB to luminance using BT.601
//! 2. **Row calculation** - keep the source aspect ratio for tall glyphs
//! 3. **Downsampling** - reduce resolution to the character grid
//! 4. **Glyph mapping** - quantize brightness into a palette bucket
//! 5. **Layout** - slice into rows joined by line breaks
//!
//! # Palettes
//!
//! Two palettes are available via [`Palette`], both ordered densest glyph
//! first so that dark pixels become heavy glyphs:
//! - `Classic` - 15 glyphs (default)
//! - `Standard` - 10-level ASCII density ramp

mod charset;
mod dimensions;
mod downsample;
mod grayscale;
mod mapping;
mod render;

pub use charset::{glyph_for, glyph_index, Palette, CLASSIC_PALETTE, STANDARD_PALETTE};
pub use dimensions::{target_height, target_height_with_factor, GLYPH_ASPECT_FACTOR};
pub use downsample::downsample;
pub use grayscale::{to_grayscale, to_grayscale_into};
pub use mapping::{layout_rows, map_to_glyphs};
pub use render::{AsciiFrame, FrameRenderer, RenderError, DEFAULT_TARGET_WIDTH};
