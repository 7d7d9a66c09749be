//! Frame windows over an archive, by offset or by cursor.
//!
//! A window never reaches the archive's last frame: it covers
//! `[start, min(start + count, len - 1))`. Callers that want every frame use
//! [`paginate_all`].

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Mutex;

use uuid::Uuid;

use crate::archive::VideoArchive;
use crate::ascii::AsciiFrame;

/// Frames keyed by their absolute index in the archive.
pub type FrameWindow = BTreeMap<usize, AsciiFrame>;

/// Index range a window starting at `start` covers, or `None` when `start`
/// is past the end.
pub fn window_bounds(len: usize, start: usize, count: usize) -> Option<Range<usize>> {
    if start >= len {
        return None;
    }
    let end = start.saturating_add(count).min(len - 1);
    Some(start..end)
}

fn collect(archive: &VideoArchive, range: Range<usize>) -> FrameWindow {
    let frames = &archive.frames()[range.clone()];
    range.zip(frames.iter().cloned()).collect()
}

/// Up to `count` frames starting at `start`.
pub fn paginate(archive: &VideoArchive, start: usize, count: usize) -> FrameWindow {
    window_bounds(archive.frame_count(), start, count)
        .map(|range| collect(archive, range))
        .unwrap_or_default()
}

/// Every frame of the archive.
pub fn paginate_all(archive: &VideoArchive) -> FrameWindow {
    collect(archive, 0..archive.frame_count())
}

/// Per-archive read positions for cursor-mode clients.
#[derive(Debug, Default)]
pub struct CursorTable {
    positions: Mutex<HashMap<String, usize>>,
}

impl CursorTable {
    /// Issue a fresh cursor positioned at frame 0.
    pub fn open(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.lock().insert(id.clone(), 0);
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.positions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the next window for `id` and move its position to the end of
    /// that window. Unknown ids start at frame 0.
    pub fn advance(&self, archive: &VideoArchive, id: &str, count: usize) -> FrameWindow {
        let mut positions = self.lock();
        let position = positions.entry(id.to_string()).or_insert(0);
        match window_bounds(archive.frame_count(), *position, count) {
            Some(range) => {
                *position = range.end;
                collect(archive, range)
            }
            None => FrameWindow::new(),
        }
    }

    /// Current position of `id`, if it has been seen.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.lock().get(id).copied()
    }

    /// Whether `id` has no further frames to read.
    pub fn is_complete(&self, archive: &VideoArchive, id: &str) -> bool {
        let position = self.position(id).unwrap_or(0);
        position + 1 >= archive.frame_count()
    }

    /// Forget `id`. Returns false if it was unknown.
    pub fn close(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
