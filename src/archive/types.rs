//! Archive data structures.

use serde::Serialize;

use crate::ascii::AsciiFrame;

/// Metadata carried in an archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveHeader {
    pub original_width: u32,
    pub original_height: u32,
    pub fps: u32,
}

impl ArchiveHeader {
    /// All three fields are positive, as the reader requires.
    pub fn is_valid(&self) -> bool {
        self.original_width > 0 && self.original_height > 0 && self.fps > 0
    }
}

/// A rendered video: header metadata plus frames in temporal order.
///
/// Always holds at least one frame; constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArchive {
    name: String,
    header: ArchiveHeader,
    frames: Vec<AsciiFrame>,
}

impl VideoArchive {
    /// Build an archive, or `None` if `frames` is empty.
    pub fn new(
        name: impl Into<String>,
        header: ArchiveHeader,
        frames: Vec<AsciiFrame>,
    ) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            header,
            frames,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> ArchiveHeader {
        self.header
    }

    pub fn original_width(&self) -> u32 {
        self.header.original_width
    }

    pub fn original_height(&self) -> u32 {
        self.header.original_height
    }

    pub fn fps(&self) -> u32 {
        self.header.fps
    }

    pub fn frames(&self) -> &[AsciiFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Metadata-only view of the archive.
    pub fn info(&self) -> ArchiveInfo {
        ArchiveInfo {
            frames_count: self.frames.len(),
            fps: self.header.fps,
            original_width: self.header.original_width,
            original_height: self.header.original_height,
        }
    }
}

/// Frame count and header metadata, without frame bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveInfo {
    pub frames_count: usize,
    pub fps: u32,
    pub original_width: u32,
    pub original_height: u32,
}
