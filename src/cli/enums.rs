//! CLI enum types.

use clap::ValueEnum;

use crate::ascii::Palette;

/// Glyph palette for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PaletteArg {
    #[default]
    Classic,
    Standard,
}

impl From<PaletteArg> for Palette {
    fn from(p: PaletteArg) -> Self {
        match p {
            PaletteArg::Classic => Palette::Classic,
            PaletteArg::Standard => Palette::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_conversion() {
        assert_eq!(Palette::from(PaletteArg::Classic), Palette::Classic);
        assert_eq!(Palette::from(PaletteArg::Standard), Palette::Standard);
    }

    #[test]
    fn test_value_names_match_config_names() {
        for arg in PaletteArg::value_variants() {
            let value = arg.to_possible_value().unwrap();
            assert_eq!(value.get_name(), Palette::from(*arg).name());
        }
    }
}
