//! Integration tests for render job admission and lifecycle.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use ascii_reel::archive::ArchiveStore;
use ascii_reel::jobs::{JobError, JobRegistry, JobState};
use tempfile::TempDir;

use common::{gated, wait_until, SolidSource};

// ==================== Admission Tests ====================

#[test]
fn test_concurrent_duplicate_submits_admit_one() {
    let dir = TempDir::new().unwrap();
    let registry = Arc::new(JobRegistry::new(ArchiveStore::new(dir.path()), 5));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let (source, tx) = gated(1);
                barrier.wait();
                let result = registry.submit("cat", source, 16);
                (result, tx)
            })
        })
        .collect();

    let mut accepted = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        let (result, tx) = handle.join().unwrap();
        match result {
            Ok(()) => accepted.push(tx),
            Err(JobError::Conflict(name)) => {
                assert_eq!(name, "cat");
                conflicts += 1;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted.len(), 1);
    assert_eq!(conflicts, 7);

    accepted[0].send(()).unwrap();
    registry.shutdown();
}

#[test]
fn test_saturation_until_reaped() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 2);

    let (a, tx_a) = gated(1);
    let (b, tx_b) = gated(1);
    registry.submit("a", a, 16).unwrap();
    registry.submit("b", b, 16).unwrap();
    assert_eq!(registry.running_count(), 2);

    let (c, _tx_c) = gated(1);
    assert!(matches!(
        registry.submit("c", c, 16),
        Err(JobError::Saturated { max: 2 })
    ));

    tx_a.send(()).unwrap();
    wait_until(|| !registry.is_running("a"), "job 'a' to finish");

    let (c, tx_c) = gated(1);
    registry.submit("c", c, 16).unwrap();

    tx_b.send(()).unwrap();
    tx_c.send(()).unwrap();
    registry.shutdown();
    assert_eq!(registry.running_count(), 0);
}

#[test]
fn test_resubmit_after_finish() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 2);

    registry
        .submit("cat", SolidSource::new(8, 8, 2, 0), 16)
        .unwrap();
    wait_until(|| !registry.is_running("cat"), "first render");
    registry
        .submit("cat", SolidSource::new(8, 8, 5, 0), 16)
        .unwrap();
    registry.shutdown();

    let archive = ArchiveStore::new(dir.path()).read("cat").unwrap();
    assert_eq!(archive.frame_count(), 5);
}

#[test]
fn test_zero_frame_source_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 2);
    assert!(matches!(
        registry.submit("cat", SolidSource::new(8, 8, 0, 0), 16),
        Err(JobError::InvalidSource)
    ));
    assert!(registry.status("cat").is_none());
}

#[test]
fn test_zero_header_field_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 2);

    for source in [
        SolidSource::new(8, 8, 2, 0).with_fps(0),
        SolidSource::new(0, 8, 2, 0),
        SolidSource::new(8, 0, 2, 0),
    ] {
        assert!(matches!(
            registry.submit("cat", source, 16),
            Err(JobError::InvalidSource)
        ));
    }
    assert!(registry.status("cat").is_none());
    assert!(!ArchiveStore::new(dir.path()).exists("cat"));
}

#[test]
fn test_concurrent_distinct_submits_respect_limit() {
    const MAX: usize = 3;
    const SUBMITTERS: usize = MAX + 3;

    let dir = TempDir::new().unwrap();
    let registry = Arc::new(JobRegistry::new(ArchiveStore::new(dir.path()), MAX));
    let barrier = Arc::new(Barrier::new(SUBMITTERS));

    let handles: Vec<_> = (0..SUBMITTERS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let (source, tx) = gated(1);
                barrier.wait();
                let result = registry.submit(&format!("clip-{i}"), source, 16);
                (result, tx)
            })
        })
        .collect();

    let mut accepted = Vec::new();
    let mut saturated = 0;
    for handle in handles {
        let (result, tx) = handle.join().unwrap();
        match result {
            Ok(()) => accepted.push(tx),
            Err(JobError::Saturated { max }) => {
                assert_eq!(max, MAX);
                saturated += 1;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(accepted.len(), MAX);
    assert_eq!(saturated, SUBMITTERS - MAX);
    assert_eq!(registry.running_count(), MAX);

    for tx in &accepted {
        tx.send(()).unwrap();
    }
    registry.shutdown();
    assert_eq!(registry.running_count(), 0);
}

// ==================== Lifecycle Tests ====================

#[test]
fn test_progress_is_monotonic() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 2);

    let (source, tx) = gated(4);
    registry.submit("cat", source, 16).unwrap();

    let mut last = 0.0;
    for sent in 1..=3 {
        tx.send(()).unwrap();
        let expected = sent as f64 / 4.0;
        wait_until(
            || registry.peek("cat").is_some_and(|s| s.progress >= expected),
            "progress",
        );
        let progress = registry.peek("cat").unwrap().progress;
        assert!(progress >= last);
        last = progress;
    }

    tx.send(()).unwrap();
    wait_until(
        || registry.peek("cat").is_some_and(|s| s.state == JobState::Finished),
        "finish",
    );
    let status = registry.status("cat").unwrap();
    assert_eq!(status.progress, 1.0);
    assert!(registry.status("cat").is_none());
}

#[test]
fn test_rendered_archive_shape() {
    let dir = TempDir::new().unwrap();
    let registry = JobRegistry::new(ArchiveStore::new(dir.path()), 1);

    // 64x36 at 20 columns: 36 / 64 * 20 * 0.55 = 6.19 -> 6 rows
    registry
        .submit("clip", SolidSource::new(64, 36, 3, 255), 20)
        .unwrap();
    registry.shutdown();

    let archive = ArchiveStore::new(dir.path()).read("clip").unwrap();
    assert_eq!(archive.frame_count(), 3);
    assert_eq!(archive.original_width(), 64);
    assert_eq!(archive.original_height(), 36);
    for frame in archive.frames() {
        let rows: Vec<&str> = frame.split('\n').collect();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.chars().count() == 20));
    }
}
