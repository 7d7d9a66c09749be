//! Archive cache module.
//!
//! Keeps decoded archives in memory while they are being read:
//! - [`ArchiveCache`] with sliding idle expiry and pinned entries
//! - Offset and cursor pagination over a cached archive

#[allow(clippy::module_inception)]
mod cache;
mod pagination;

pub use cache::{ArchiveCache, CachedArchive, DEFAULT_IDLE_TIMEOUT};
pub use pagination::{paginate, paginate_all, window_bounds, CursorTable, FrameWindow};
