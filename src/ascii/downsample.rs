//! Downsampling grayscale rasters to the character grid.

use image::imageops::{self, FilterType};
use image::GrayImage;

/// Downsample a grayscale image to a character grid.
///
/// Resizing is delegated to the `image` crate's triangle (bilinear) filter,
/// which handles both shrinking and the rare case of a source smaller than
/// the requested grid.
///
/// # Arguments
/// * `gray` - Grayscale pixel data (one byte per pixel, row-major order)
/// * `img_width` - Width of the source image in pixels
/// * `img_height` - Height of the source image in pixels
/// * `char_width` - Desired output width in characters
/// * `char_height` - Desired output height in characters
///
/// # Returns
/// A vector of brightness values (0-255), one per character cell, in row-major
/// order, or `None` if `gray` doesn't hold exactly `img_width * img_height`
/// samples. The result is empty when any dimension is 0.
pub fn downsample(
    gray: &[u8],
    img_width: u32,
    img_height: u32,
    char_width: u32,
    char_height: u32,
) -> Option<Vec<u8>> {
    if char_width == 0 || char_height == 0 || img_width == 0 || img_height == 0 {
        return Some(Vec::new());
    }

    if gray.len() != img_width as usize * img_height as usize {
        return None;
    }
    let source = GrayImage::from_raw(img_width, img_height, gray.to_vec())?;

    let resized = imageops::resize(&source, char_width, char_height, FilterType::Triangle);
    Some(resized.into_raw())
}
