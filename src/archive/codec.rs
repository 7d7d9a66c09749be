//! Archive byte format.
//!
//! An archive is a gzip stream over UTF-8 text:
//!
//! ```text
//! {width}x{height}x{fps}\n
//! <frame 0>\n\~\n
//! <frame 1>\n\~\n
//! ...
//! ```
//!
//! Every frame, the last one included, is followed by the delimiter line.
//! Rendered frames only contain palette glyphs and `'\n'`, and no palette
//! contains `\` or `~`, so the delimiter can't occur inside a frame.

use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::error::ArchiveError;
use super::types::{ArchiveHeader, VideoArchive};
use crate::ascii::AsciiFrame;

/// Line written between frames.
pub const FRAME_DELIMITER: &str = "\\~";

/// Gzip level used for archives (1 = fastest, 9 = smallest).
pub const COMPRESSION_LEVEL: u32 = 5;

fn separator() -> String {
    format!("\n{FRAME_DELIMITER}\n")
}

/// Format the header line, including its trailing newline.
pub fn format_header(header: &ArchiveHeader) -> String {
    format!(
        "{}x{}x{}\n",
        header.original_width, header.original_height, header.fps
    )
}

/// Parse a header line (without its newline).
///
/// Exactly three positive integers separated by `x`.
pub fn parse_header(line: &str) -> Option<ArchiveHeader> {
    let fields: Vec<&str> = line.trim_end_matches('\r').split('x').collect();
    if fields.len() != 3 {
        return None;
    }
    let mut values = [0u32; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field.trim().parse().ok().filter(|&v| v > 0)?;
    }
    Some(ArchiveHeader {
        original_width: values[0],
        original_height: values[1],
        fps: values[2],
    })
}

/// Write `archive` as a compressed stream into `writer`.
///
/// Returns the inner writer once the gzip trailer has been written.
pub fn encode<W: Write>(archive: &VideoArchive, writer: W) -> std::io::Result<W> {
    let mut encoder = GzEncoder::new(writer, Compression::new(COMPRESSION_LEVEL));
    let sep = separator();

    encoder.write_all(format_header(&archive.header()).as_bytes())?;
    for frame in archive.frames() {
        encoder.write_all(frame.as_bytes())?;
        encoder.write_all(sep.as_bytes())?;
    }

    encoder.finish()
}

/// Decode a compressed archive stream.
///
/// `path` only labels errors. The returned frame list may be empty; callers
/// decide how to report that.
///
/// # Errors
/// * `ArchiveError::Corrupt` - Broken gzip data, invalid UTF-8, a malformed
///   header, or a body that doesn't end with the delimiter line
pub fn decode<R: Read>(
    reader: R,
    path: &Path,
) -> Result<(ArchiveHeader, Vec<AsciiFrame>), ArchiveError> {
    let mut content = String::new();
    GzDecoder::new(reader)
        .read_to_string(&mut content)
        .map_err(|e| ArchiveError::corrupt(path, format!("unreadable gzip text: {e}")))?;

    let (header_line, body) = content
        .split_once('\n')
        .ok_or_else(|| ArchiveError::corrupt(path, "missing header line"))?;
    let header = parse_header(header_line)
        .ok_or_else(|| ArchiveError::corrupt(path, format!("malformed header '{header_line}'")))?;

    let mut frames: Vec<AsciiFrame> = body.split(separator().as_str()).map(String::from).collect();

    // Text after the final delimiter must be empty; anything else means the
    // writer stopped mid-frame.
    match frames.pop() {
        Some(tail) if tail.is_empty() => {}
        _ => return Err(ArchiveError::corrupt(path, "truncated final frame")),
    }

    Ok((header, frames))
}
