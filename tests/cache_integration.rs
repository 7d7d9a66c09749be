//! Integration tests for the archive cache: idle expiry, pinning and cursors.

mod common;

use std::thread;
use std::time::Duration;

use ascii_reel::archive::{ArchiveError, ArchiveStore};
use ascii_reel::cache::ArchiveCache;
use tempfile::TempDir;

use common::{wait_until, write_archive};

const TTL: Duration = Duration::from_millis(300);

#[test]
fn test_pinned_entry_outlives_timeout() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    write_archive(&store, "intro", 3);
    let cache = ArchiveCache::with_idle_timeout(store, TTL);

    assert_eq!(cache.preload(["intro"]), 1);
    thread::sleep(TTL * 3);
    assert!(cache.contains("intro"));
}

#[test]
fn test_sliding_timeout_and_reload() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    let written = write_archive(&store, "cat", 3);
    let cache = ArchiveCache::with_idle_timeout(store, TTL);

    cache.get("cat", false).unwrap();
    thread::sleep(TTL / 2);
    assert!(cache.contains("cat"));

    // Touch restarts the full timeout
    cache.get("cat", false).unwrap();
    thread::sleep(TTL / 2);
    assert!(cache.contains("cat"));
    cache.get("cat", false).unwrap();
    thread::sleep(TTL / 2);
    assert!(cache.contains("cat"));

    // Left alone, the entry goes away
    wait_until(|| !cache.contains("cat"), "idle eviction");

    let reloaded = cache.get("cat", false).unwrap();
    assert_eq!(reloaded.archive(), &written);
}

#[test]
fn test_errors_propagate_without_caching() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.txt.gz"), b"not gzip").unwrap();
    let cache = ArchiveCache::with_idle_timeout(ArchiveStore::new(dir.path()), TTL);

    assert!(matches!(
        cache.get("missing", false),
        Err(ArchiveError::NotFound { .. })
    ));
    assert!(matches!(
        cache.get("broken", false),
        Err(ArchiveError::Corrupt { .. })
    ));
    assert!(cache.is_empty());
}

#[test]
fn test_many_names_expire_independently() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    for name in ["a", "b", "c"] {
        write_archive(&store, name, 2);
    }
    let cache = ArchiveCache::with_idle_timeout(store, TTL);

    cache.get("a", false).unwrap();
    cache.get("b", true).unwrap();
    cache.get("c", false).unwrap();
    assert_eq!(cache.len(), 3);

    wait_until(|| cache.len() == 1, "unpinned entries to expire");
    assert!(cache.contains("b"));
}

#[test]
fn test_cursor_reads_whole_window_sequence() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    write_archive(&store, "clip", 10);
    let cache = ArchiveCache::with_idle_timeout(store, TTL);

    let entry = cache.get("clip", false).unwrap();
    let id = entry.open_cursor();
    let mut seen = Vec::new();
    while !entry.is_complete(&id) {
        let window = entry.advance(&id, 4);
        assert!(!window.is_empty());
        seen.extend(window.into_keys());
    }
    assert_eq!(seen, (0..9).collect::<Vec<_>>());
}

#[test]
fn test_shutdown_stops_timers() {
    let dir = TempDir::new().unwrap();
    let store = ArchiveStore::new(dir.path());
    write_archive(&store, "cat", 2);
    let cache = ArchiveCache::with_idle_timeout(store, Duration::from_secs(3600));

    cache.get("cat", false).unwrap();
    cache.shutdown();
    assert!(cache.is_empty());
}
