//! Glyph palettes and the intensity-to-glyph quantizer.

/// Classic palette (15 levels).
/// Characters ordered from densest (`M`) to sparsest (`:`), so the darkest
/// pixels land on the heaviest glyphs.
pub const CLASSIC_PALETTE: &[char] = &[
    'M', '@', '$', '&', '#', '%', 'X', '9', '5', 'A', 'O', '*', '+', '<', ':',
];

/// Standard ASCII density ramp (10 levels), densest first.
pub const STANDARD_PALETTE: &[char] = &['@', '%', '#', '*', '+', '=', '-', ':', '.', ' '];

/// Glyph palette used when rendering frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Classic palette (15 levels)
    #[default]
    Classic,
    /// Standard ASCII density ramp (10 levels)
    Standard,
}

impl Palette {
    /// Get the glyph slice for this palette, densest glyph first.
    pub fn glyphs(&self) -> &'static [char] {
        match self {
            Palette::Classic => CLASSIC_PALETTE,
            Palette::Standard => STANDARD_PALETTE,
        }
    }

    /// Get a human-readable name for the palette.
    pub fn name(&self) -> &'static str {
        match self {
            Palette::Classic => "classic",
            Palette::Standard => "standard",
        }
    }

    /// Parse a palette from its config/CLI name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Palette::Classic),
            "standard" => Some(Palette::Standard),
            _ => None,
        }
    }
}

/// Bucket index for an 8-bit intensity in a palette of `levels` glyphs.
///
/// The bucket width is `ceil(255 / levels) + 1`, and the result is clamped to
/// `levels - 1` so palettes whose buckets don't cover 255 exactly stay in range.
/// Zero levels map everything to 0.
#[inline]
pub fn glyph_index(intensity: u8, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    let bucket = 255usize.div_ceil(levels) + 1;
    (intensity as usize / bucket).min(levels - 1)
}

/// Map a grayscale intensity to a glyph from `palette`.
///
/// Returns a space for an empty palette.
#[inline]
pub fn glyph_for(intensity: u8, palette: &[char]) -> char {
    if palette.is_empty() {
        return ' ';
    }
    palette[glyph_index(intensity, palette.len())]
}
