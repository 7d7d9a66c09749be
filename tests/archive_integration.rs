//! Integration tests for archive files: writing, reading and paginating.

mod common;

use std::io::Write;

use ascii_reel::archive::{ArchiveError, ArchiveStore};
use ascii_reel::cache::{paginate, paginate_all};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use common::cat_archive;

fn write_raw(dir: &TempDir, file: &str, text: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    std::fs::write(dir.path().join(file), encoder.finish().unwrap()).unwrap();
}

// ==================== Round Trip Tests ====================

#[test]
fn test_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    let original = cat_archive();

    let path = store.write(&original).unwrap();
    assert!(path.ends_with("cat.txt.gz"));

    let loaded = store.read("cat").unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_rendered_frames_round_trip() {
    use ascii_reel::archive::{ArchiveHeader, VideoArchive};
    use ascii_reel::ascii::{FrameRenderer, Palette};
    use ascii_reel::video::RawFrame;

    let mut renderer = FrameRenderer::with_palette(32, Palette::Standard, false).unwrap();
    let frames = (0..4u8)
        .map(|i| {
            let data = (0..48 * 27 * 3).map(|p| (p as u8).wrapping_mul(i + 1)).collect();
            renderer.render(&RawFrame::new(48, 27, data)).unwrap()
        })
        .collect();
    let header = ArchiveHeader {
        original_width: 48,
        original_height: 27,
        fps: 30,
    };
    let archive = VideoArchive::new("noise", header, frames).unwrap();

    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    store.write(&archive).unwrap();
    assert_eq!(store.read("noise.txt.gz").unwrap(), archive);
}

// ==================== Cat Scenario ====================

#[test]
fn test_cat_scenario_pagination() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    let original = cat_archive();
    store.write(&original).unwrap();
    let cat = store.read("cat").unwrap();

    let window = paginate(&cat, 0, 2);
    assert_eq!(window.len(), 2);
    assert_eq!(window[&0], original.frames()[0]);
    assert_eq!(window[&1], original.frames()[1]);

    assert!(paginate(&cat, 2, 5).is_empty());
    assert!(paginate(&cat, 3, 1).is_empty());

    let all = paginate_all(&cat);
    assert_eq!(all.len(), 3);
    assert_eq!(all[&2], original.frames()[2]);
}

#[test]
fn test_window_past_end_is_always_empty() {
    let cat = cat_archive();
    for start in [3, 4, 100, usize::MAX] {
        for count in [0, 1, 5, usize::MAX] {
            assert!(paginate(&cat, start, count).is_empty());
        }
    }
}

// ==================== Error Tests ====================

#[test]
fn test_read_missing_archive() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    match store.read("nope") {
        Err(ArchiveError::NotFound { name }) => assert_eq!(name, "nope"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_read_wrong_header_field_count() {
    let dir = TempDir::new().unwrap();
    write_raw(&dir, "bad.txt.gz", "10x8\nMMMM\n\\~\n");
    let store = ArchiveStore::new(dir.path());
    assert!(matches!(store.read("bad"), Err(ArchiveError::Corrupt { .. })));
}

#[test]
fn test_read_non_numeric_header() {
    let dir = TempDir::new().unwrap();
    write_raw(&dir, "bad.txt.gz", "tenx8x24\nMMMM\n\\~\n");
    let store = ArchiveStore::new(dir.path());
    assert!(matches!(store.read("bad"), Err(ArchiveError::Corrupt { .. })));
}

#[test]
fn test_read_header_without_frames() {
    let dir = TempDir::new().unwrap();
    write_raw(&dir, "blank.txt.gz", "10x8x24\n");
    let store = ArchiveStore::new(dir.path());
    assert!(matches!(
        store.read("blank"),
        Err(ArchiveError::EmptyArchive { .. })
    ));
}

#[test]
fn test_read_plain_text_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("plain.txt.gz"), "10x8x24\nMMMM\n\\~\n").unwrap();
    let store = ArchiveStore::new(dir.path());
    assert!(matches!(store.read("plain"), Err(ArchiveError::Corrupt { .. })));
}

#[test]
fn test_overwrite_is_visible_to_new_reads_only() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    store.write(&cat_archive()).unwrap();
    let held = store.read("cat").unwrap();

    common::write_archive(&store, "cat", 7);
    assert_eq!(held.frame_count(), 3);
    assert_eq!(store.read("cat").unwrap().frame_count(), 7);
}
