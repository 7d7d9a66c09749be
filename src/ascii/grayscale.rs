//! RGB to grayscale conversion using ITU-R BT.601 luminance formula.

use crate::video::RawFrame;

/// Convert an RGB frame to grayscale using ITU-R BT.601 luminance formula.
///
/// The luminance formula is: Y = 0.299*R + 0.587*G + 0.114*B
///
/// This function uses integer math, with the coefficients scaled by 1000:
/// - R: 299/1000
/// - G: 587/1000
/// - B: 114/1000
///
/// # Arguments
/// * `frame` - An RGB frame from a video source
///
/// # Returns
/// A vector of grayscale values (0-255), one per pixel
pub fn to_grayscale(frame: &RawFrame) -> Vec<u8> {
    let mut gray = Vec::with_capacity(frame.pixel_count());
    to_grayscale_into(frame, &mut gray);
    gray
}

/// Convert an RGB frame to grayscale, reusing an existing buffer.
///
/// Render jobs call this once per source frame with the same buffer.
///
/// # Returns
/// The number of pixels written to the buffer
pub fn to_grayscale_into(frame: &RawFrame, buffer: &mut Vec<u8>) -> usize {
    buffer.clear();
    buffer.reserve(frame.pixel_count());

    for rgb in frame.data.chunks_exact(3) {
        let r = rgb[0] as u32;
        let g = rgb[1] as u32;
        let b = rgb[2] as u32;
        let luminance = (299 * r + 587 * g + 114 * b) / 1000;
        buffer.push(luminance as u8);
    }

    buffer.len()
}
