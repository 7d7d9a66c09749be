//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::PaletteArg;

/// Render videos into ASCII-art archives and read them back
#[derive(Parser, Debug)]
#[command(name = "ascii-reel")]
#[command(version, about = "Video to ASCII-art archive renderer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Archive directory (overrides storage.dir)
    #[arg(long, short, global = true)]
    pub dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a video file into an archive and wait for it to finish
    Convert {
        /// Video file to render
        video: PathBuf,

        /// Columns per frame (default: jobs.default_width)
        #[arg(long, short)]
        width: Option<u32>,

        /// Archive name (default: the video's file name without extension)
        #[arg(long, short)]
        name: Option<String>,

        /// Glyph palette (default: render.palette)
        #[arg(long)]
        palette: Option<PaletteArg>,

        /// Map bright pixels to dense glyphs (for light terminals)
        #[arg(long)]
        invert: bool,
    },
    /// Print archive metadata as JSON
    Info {
        /// Archive name
        name: String,
    },
    /// Print a window of frames as JSON
    Frames {
        /// Archive name
        name: String,

        /// First frame index
        #[arg(long, short, default_value = "0")]
        start: usize,

        /// Number of frames (0 = all)
        #[arg(long, short = 'n', default_value = "0")]
        count: usize,
    },
    /// Play an archive in the terminal
    Play {
        /// Archive name
        name: String,

        /// Frames fetched per request
        #[arg(long, short, default_value = "48")]
        batch: usize,
    },
    /// List archives in the archive directory
    List,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
