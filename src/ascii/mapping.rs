//! Brightness to glyph mapping and row layout.

use super::charset::glyph_for;

/// Map brightness values to glyphs.
///
/// Converts a grid of brightness values (0-255) to glyphs from the provided
/// palette. Lower brightness maps to earlier glyphs (denser), higher
/// brightness to later glyphs (sparser).
///
/// # Arguments
/// * `brightness` - Brightness values (0-255), one per character cell
/// * `palette` - Glyphs ordered from densest to sparsest
/// * `invert` - If true, invert brightness before mapping (for light-on-dark terminals)
///
/// # Example
/// ```
/// use ascii_reel::ascii::{map_to_glyphs, CLASSIC_PALETTE};
/// let glyphs = map_to_glyphs(&[0, 255], CLASSIC_PALETTE, false);
/// assert_eq!(glyphs, vec!['M', ':']);
/// ```
pub fn map_to_glyphs(brightness: &[u8], palette: &[char], invert: bool) -> Vec<char> {
    brightness
        .iter()
        .map(|&b| {
            let b = if invert { 255 - b } else { b };
            glyph_for(b, palette)
        })
        .collect()
}

/// Lay out a flat glyph sequence as rows of `width` characters joined by `'\n'`.
///
/// No trailing newline is written. A trailing partial row is kept as-is.
pub fn layout_rows(glyphs: &[char], width: usize) -> String {
    if width == 0 || glyphs.is_empty() {
        return String::new();
    }

    let rows = glyphs.len().div_ceil(width);
    let mut out = String::with_capacity(glyphs.len() + rows - 1);

    for (i, row) in glyphs.chunks(width).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.extend(row.iter());
    }

    out
}
