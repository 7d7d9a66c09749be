//! Video input module.
//!
//! This module defines the boundary between the renderer and whatever
//! decodes video:
//! - Frames and metadata via [`RawFrame`] and [`VideoInfo`]
//! - The [`VideoSource`] trait render jobs consume
//! - An `ffmpeg`-backed implementation via [`FfmpegSource`]

mod ffmpeg;
mod source;
mod types;

pub use ffmpeg::{probe_video, FfmpegSource};
pub use source::{archive_name_for, VideoSource};
pub use types::{RawFrame, SourceError, VideoInfo};
