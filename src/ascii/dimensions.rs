//! Row count calculation for fixed-width ASCII frames.

/// Glyph aspect compensation.
/// Monospaced glyphs are roughly twice as tall as they are wide, so the
/// character grid needs about half as many rows as the pixel grid would.
pub const GLYPH_ASPECT_FACTOR: f64 = 0.55;

/// Calculate how many rows a `target_width`-column frame needs to keep the
/// source aspect ratio on screen.
///
/// `target_height = round(source_height / source_width * target_width * 0.55)`,
/// never less than 1.
///
/// Returns 0 only when any input dimension is 0.
///
/// # Example
/// ```
/// use ascii_reel::ascii::target_height;
/// // 640x480 at 240 columns: 0.75 * 240 * 0.55 = 99
/// assert_eq!(target_height(640, 480, 240), 99);
/// ```
pub fn target_height(source_width: u32, source_height: u32, target_width: u32) -> u32 {
    target_height_with_factor(source_width, source_height, target_width, GLYPH_ASPECT_FACTOR)
}

/// Calculate the row count with a custom glyph aspect factor.
pub fn target_height_with_factor(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    factor: f64,
) -> u32 {
    if source_width == 0 || source_height == 0 || target_width == 0 {
        return 0;
    }

    let aspect_ratio = source_height as f64 / source_width as f64;
    let height = (aspect_ratio * target_width as f64 * factor).round() as u32;
    height.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape() {
        // 1920x1080 at 240 columns: 0.5625 * 240 * 0.55 = 74.25
        assert_eq!(target_height(1920, 1080, 240), 74);
    }

    #[test]
    fn test_portrait_is_taller_than_landscape() {
        let landscape = target_height(1920, 1080, 100);
        let portrait = target_height(1080, 1920, 100);
        assert!(portrait > landscape);
        // 1.777.. * 100 * 0.55 = 97.77
        assert_eq!(portrait, 98);
    }

    #[test]
    fn test_minimum_one_row() {
        // Very wide strip rounds to 0 rows without the floor
        assert_eq!(target_height(10_000, 1, 4), 1);
    }

    #[test]
    fn test_zero_dimensions() {
        assert_eq!(target_height(0, 480, 240), 0);
        assert_eq!(target_height(640, 0, 240), 0);
        assert_eq!(target_height(640, 480, 0), 0);
    }
}
