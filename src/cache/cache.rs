//! In-memory archive cache with idle expiry.
//!
//! Each unpinned entry owns one timer thread that waits on a channel for the
//! idle timeout. Every access sends a touch which restarts the wait. When the
//! wait runs out the thread takes the cache lock and evicts the entry, unless
//! a touch arrived in the meantime or the entry has since been pinned,
//! replaced or evicted.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::archive::{canonical_name, ArchiveError, ArchiveInfo, ArchiveStore, VideoArchive};

use super::pagination::{paginate, paginate_all, CursorTable, FrameWindow};

/// How long an unpinned archive stays cached without being read.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// A cached archive together with the cursors open against it.
#[derive(Debug)]
pub struct CachedArchive {
    archive: VideoArchive,
    cursors: CursorTable,
}

impl CachedArchive {
    pub fn new(archive: VideoArchive) -> Self {
        Self {
            archive,
            cursors: CursorTable::default(),
        }
    }

    pub fn archive(&self) -> &VideoArchive {
        &self.archive
    }

    pub fn info(&self) -> ArchiveInfo {
        self.archive.info()
    }

    pub fn paginate(&self, start: usize, count: usize) -> FrameWindow {
        paginate(&self.archive, start, count)
    }

    pub fn paginate_all(&self) -> FrameWindow {
        paginate_all(&self.archive)
    }

    pub fn open_cursor(&self) -> String {
        self.cursors.open()
    }

    pub fn advance(&self, id: &str, count: usize) -> FrameWindow {
        self.cursors.advance(&self.archive, id, count)
    }

    pub fn is_complete(&self, id: &str) -> bool {
        self.cursors.is_complete(&self.archive, id)
    }

    pub fn cursors(&self) -> &CursorTable {
        &self.cursors
    }
}

#[derive(Debug)]
struct Timer {
    id: u64,
    touch: Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Slot {
    entry: Arc<CachedArchive>,
    pinned: bool,
    timer: Option<Timer>,
}

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<String, Slot>,
    next_timer_id: u64,
    /// Timer threads that were cancelled but not yet joined
    retired: Vec<JoinHandle<()>>,
}

impl CacheState {
    /// Cancel a timer. Dropping the sender wakes its thread, which then exits.
    fn retire(&mut self, timer: Timer) {
        drop(timer.touch);
        self.retired.retain(|h| !h.is_finished());
        self.retired.push(timer.handle);
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<CacheState>,
    store: ArchiveStore,
    idle_timeout: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Cache of decoded archives, keyed by archive name.
///
/// Pinned entries never expire. All map changes, including timer evictions,
/// happen under one mutex, so a reader either finds an entry and gets it or
/// finds nothing and reloads from disk.
#[derive(Debug)]
pub struct ArchiveCache {
    shared: Arc<Shared>,
}

impl ArchiveCache {
    pub fn new(store: ArchiveStore) -> Self {
        Self::with_idle_timeout(store, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(store: ArchiveStore, idle_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CacheState::default()),
                store,
                idle_timeout,
            }),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.shared.idle_timeout
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.shared.store
    }

    /// Get an archive, loading it from disk on a miss.
    ///
    /// A hit on an unpinned entry restarts its idle timer. Passing
    /// `pinned = true` pins the entry, whether it was cached already or not.
    ///
    /// # Errors
    /// * `ArchiveError::NotFound` - No archive file for `name`
    /// * `ArchiveError::Corrupt` - The file exists but can't be decoded
    /// * `ArchiveError::EmptyArchive` - The file holds no frames
    pub fn get(&self, name: &str, pinned: bool) -> Result<Arc<CachedArchive>, ArchiveError> {
        let key = canonical_name(name);

        if let Some(entry) = self.hit(key, pinned) {
            return Ok(entry);
        }

        // Load without holding the lock so readers of other archives aren't
        // stuck behind disk I/O.
        let archive = self.load(name)?;

        let mut state = self.shared.lock();
        if let Some(slot) = state.slots.get(key) {
            // Someone else loaded it while we were reading
            let entry = Arc::clone(&slot.entry);
            drop(state);
            return Ok(self.hit(key, pinned).unwrap_or(entry));
        }

        let entry = Arc::new(CachedArchive::new(archive));
        let timer = if pinned {
            None
        } else {
            Some(self.spawn_timer(&mut *state, key)?)
        };
        state.slots.insert(
            key.to_string(),
            Slot {
                entry: Arc::clone(&entry),
                pinned,
                timer,
            },
        );
        log::info!(
            "Cached archive '{}' ({} frames{})",
            key,
            entry.archive().frame_count(),
            if pinned { ", pinned" } else { "" }
        );
        Ok(entry)
    }

    /// Look up a cached entry, touching or pinning it.
    fn hit(&self, key: &str, pinned: bool) -> Option<Arc<CachedArchive>> {
        let mut state = self.shared.lock();
        let slot = state.slots.get_mut(key)?;
        let entry = Arc::clone(&slot.entry);

        if pinned && !slot.pinned {
            slot.pinned = true;
            if let Some(timer) = slot.timer.take() {
                state.retire(timer);
            }
            log::debug!("Pinned archive '{}'", key);
        } else if let Some(timer) = &slot.timer {
            let _ = timer.touch.send(());
        }
        Some(entry)
    }

    fn load(&self, name: &str) -> Result<VideoArchive, ArchiveError> {
        let result = self.shared.store.read(name);
        if let Err(e @ ArchiveError::Corrupt { .. }) = &result {
            log::error!("{}", e);
        }
        result
    }

    fn spawn_timer(&self, state: &mut CacheState, key: &str) -> Result<Timer, ArchiveError> {
        let id = state.next_timer_id;
        state.next_timer_id += 1;

        let (touch, touches) = mpsc::channel();
        let shared = Arc::downgrade(&self.shared);
        let name = key.to_string();
        let timeout = self.shared.idle_timeout;
        let handle = thread::Builder::new()
            .name(format!("cache-ttl-{key}"))
            .spawn(move || run_timer(shared, name, id, touches, timeout))?;

        Ok(Timer { id, touch, handle })
    }

    /// Load and pin every name. Failures are logged and skipped.
    ///
    /// Returns how many archives were loaded.
    pub fn preload<I, N>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut loaded = 0;
        for name in names {
            let name = name.as_ref();
            match self.get(name, true) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping preload of '{}': {}", name, e),
            }
        }
        loaded
    }

    /// Replace an entry with a fresh copy from disk and pin it.
    pub fn reload_pinned(&self, name: &str) -> Result<Arc<CachedArchive>, ArchiveError> {
        let archive = self.load(name)?;
        let key = canonical_name(name);
        let entry = Arc::new(CachedArchive::new(archive));

        let mut state = self.shared.lock();
        let previous = state.slots.insert(
            key.to_string(),
            Slot {
                entry: Arc::clone(&entry),
                pinned: true,
                timer: None,
            },
        );
        if let Some(timer) = previous.and_then(|slot| slot.timer) {
            state.retire(timer);
        }
        log::info!("Reloaded pinned archive '{}'", key);
        Ok(entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shared.lock().slots.contains_key(canonical_name(name))
    }

    pub fn is_pinned(&self, name: &str) -> bool {
        self.shared
            .lock()
            .slots
            .get(canonical_name(name))
            .is_some_and(|slot| slot.pinned)
    }

    pub fn len(&self) -> usize {
        self.shared.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop an entry, pinned or not. Returns false if it wasn't cached.
    pub fn evict(&self, name: &str) -> bool {
        let mut state = self.shared.lock();
        match state.slots.remove(canonical_name(name)) {
            Some(slot) => {
                if let Some(timer) = slot.timer {
                    state.retire(timer);
                }
                log::info!("Evicted archive '{}'", canonical_name(name));
                true
            }
            None => false,
        }
    }

    /// Drop every entry and wait for all timer threads to exit.
    pub fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut state = self.shared.lock();
            let timers: Vec<Timer> = state
                .slots
                .drain()
                .filter_map(|(_, slot)| slot.timer)
                .collect();
            let mut handles = std::mem::take(&mut state.retired);
            for timer in timers {
                drop(timer.touch);
                handles.push(timer.handle);
            }
            handles
        };

        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for ArchiveCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_timer(
    shared: Weak<Shared>,
    name: String,
    id: u64,
    touches: Receiver<()>,
    timeout: Duration,
) {
    loop {
        match touches.recv_timeout(timeout) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut state = shared.lock();

        // A touch sent just before we got the lock still counts
        if touches.try_recv().is_ok() {
            continue;
        }

        let owned = state
            .slots
            .get(&name)
            .and_then(|slot| slot.timer.as_ref())
            .is_some_and(|timer| timer.id == id);
        if owned {
            state.slots.remove(&name);
            log::info!("Evicted idle archive '{}' after {:?}", name, timeout);
        }
        return;
    }
}
