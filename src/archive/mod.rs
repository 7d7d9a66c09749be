//! Video archive module.
//!
//! Rendered videos are persisted as gzip-compressed text files named
//! `{name}.txt.gz` inside one storage directory.
//! - Byte format via [`encode`] and [`decode`]
//! - File handling via [`ArchiveStore`]

mod codec;
mod error;
mod store;
mod types;

pub use codec::{decode, encode, format_header, parse_header, COMPRESSION_LEVEL, FRAME_DELIMITER};
pub use error::ArchiveError;
pub use store::{canonical_name, validate_name, ArchiveStore, ARCHIVE_SUFFIX};
pub use types::{ArchiveHeader, ArchiveInfo, VideoArchive};
