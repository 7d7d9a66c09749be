//! The decoding boundary: anything that can hand out frames in order.

use std::path::Path;

use super::types::{RawFrame, SourceError, VideoInfo};

/// A single-pass stream of decoded frames plus upfront metadata.
///
/// Render jobs move their source onto a worker thread, hence `Send`.
pub trait VideoSource: Send {
    /// Metadata known before decoding starts.
    fn info(&self) -> &VideoInfo;

    /// Decode the next frame, or `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError>;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn info(&self) -> &VideoInfo {
        (**self).info()
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        (**self).next_frame()
    }
}

/// Archive name for a source file: the file name without its last extension.
///
/// `clips/cat.mp4` becomes `cat`, `a.b.mov` becomes `a.b`. Returns `None` for
/// paths without a usable file name.
pub fn archive_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
