//! Stub video sources and archive helpers shared by the integration tests.
#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use ascii_reel::archive::{ArchiveHeader, ArchiveStore, VideoArchive};
use ascii_reel::video::{RawFrame, SourceError, VideoInfo, VideoSource};

/// Source that yields `frames` copies of one frame.
pub struct SolidSource {
    info: VideoInfo,
    value: u8,
    left: u64,
}

impl SolidSource {
    pub fn new(width: u32, height: u32, frames: u64, value: u8) -> Self {
        Self {
            info: VideoInfo {
                width,
                height,
                fps: 24,
                frame_count: frames,
            },
            value,
            left: frames,
        }
    }

    /// Override the reported frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.info.fps = fps;
        self
    }
}

impl VideoSource for SolidSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        if self.left == 0 {
            return Ok(None);
        }
        self.left -= 1;
        let len = (self.info.width * self.info.height * 3) as usize;
        Ok(Some(RawFrame::new(
            self.info.width,
            self.info.height,
            vec![self.value; len],
        )))
    }
}

/// Source that blocks before every frame until the test opens the gate.
pub struct GatedSource {
    info: VideoInfo,
    gate: Receiver<()>,
    left: u64,
}

/// Returns the source and the sender that releases one frame per message.
/// Dropping the sender makes the source fail.
pub fn gated(frames: u64) -> (GatedSource, Sender<()>) {
    let (tx, rx) = mpsc::channel();
    let source = GatedSource {
        info: VideoInfo {
            width: 8,
            height: 8,
            fps: 24,
            frame_count: frames,
        },
        gate: rx,
        left: frames,
    };
    (source, tx)
}

impl VideoSource for GatedSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        if self.left == 0 {
            return Ok(None);
        }
        self.gate
            .recv()
            .map_err(|_| SourceError::Decode("gate closed".to_string()))?;
        self.left -= 1;
        Ok(Some(RawFrame::new(8, 8, vec![200; 8 * 8 * 3])))
    }
}

/// The "cat" archive: 3 frames, 10x8 source at 24 fps.
pub fn cat_archive() -> VideoArchive {
    let header = ArchiveHeader {
        original_width: 10,
        original_height: 8,
        fps: 24,
    };
    let frames = vec![
        "MMMM\n@@@@".to_string(),
        "$$$$\n&&&&".to_string(),
        "::::\n<<<<".to_string(),
    ];
    VideoArchive::new("cat", header, frames).unwrap()
}

pub fn write_archive(store: &ArchiveStore, name: &str, frames: usize) -> VideoArchive {
    let header = ArchiveHeader {
        original_width: 10,
        original_height: 8,
        fps: 24,
    };
    let frames = (0..frames).map(|i| format!("frame-{i}")).collect();
    let archive = VideoArchive::new(name, header, frames).unwrap();
    store.write(&archive).unwrap();
    archive
}

/// Poll `check` until it returns true or five seconds pass.
pub fn wait_until(mut check: impl FnMut() -> bool, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(10));
    }
}
