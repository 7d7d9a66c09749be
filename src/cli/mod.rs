//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    ctrlc_received, handle_config_action, run_convert, run_frames, run_info, run_list, run_play,
    setup_ctrlc_handler,
};
pub use enums::PaletteArg;
