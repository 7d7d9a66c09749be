//! Admission control and bookkeeping for render jobs.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::archive::ArchiveStore;
use crate::ascii::{FrameRenderer, Palette};
use crate::video::VideoSource;

use super::job::{JobState, JobStatus, RenderJob};

/// Default number of renders allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Reasons a submission is rejected.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("a render for '{0}' is already running")]
    Conflict(String),

    #[error("too many renders running (max {max})")]
    Saturated { max: usize },

    #[error("source reports no frames or a zero width, height or fps")]
    InvalidSource,

    #[error("target width must be at least 1 column")]
    InvalidWidth,

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Tracks render jobs by archive name.
///
/// Every admission decision happens under one mutex, so two concurrent
/// submissions for the same name can't both be accepted.
#[derive(Debug)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, RenderJob>>,
    store: ArchiveStore,
    max_concurrent: usize,
    palette: Palette,
    invert: bool,
    reserved: HashSet<String>,
}

impl JobRegistry {
    pub fn new(store: ArchiveStore, max_concurrent: usize) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            store,
            max_concurrent: max_concurrent.max(1),
            palette: Palette::default(),
            invert: false,
            reserved: HashSet::new(),
        }
    }

    /// Palette and inversion used for every job this registry starts.
    pub fn with_palette(mut self, palette: Palette, invert: bool) -> Self {
        self.palette = palette;
        self.invert = invert;
        self
    }

    /// Names whose finished jobs linger until [`release`](Self::release).
    pub fn with_reserved<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.reserved = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RenderJob>> {
        // A panic while holding the lock leaves the map itself consistent
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start rendering `source` into the archive `name`.
    ///
    /// Returns as soon as the worker thread is running.
    ///
    /// # Errors
    /// * `JobError::InvalidWidth` - If `width` is 0
    /// * `JobError::InvalidSource` - If the source reports zero frames, or a
    ///   zero width, height or fps
    /// * `JobError::Conflict` - If a render for `name` is still running
    /// * `JobError::Saturated` - If `max_concurrent` renders are running
    pub fn submit<S>(&self, name: &str, source: S, width: u32) -> Result<(), JobError>
    where
        S: VideoSource + 'static,
    {
        let renderer = FrameRenderer::with_palette(width, self.palette, self.invert)
            .map_err(|_| JobError::InvalidWidth)?;
        let info = source.info();
        if info.frame_count == 0 || info.width == 0 || info.height == 0 || info.fps == 0 {
            return Err(JobError::InvalidSource);
        }

        let mut jobs = self.lock();
        self.reap_locked(&mut jobs);

        if jobs.get(name).is_some_and(RenderJob::is_running) {
            return Err(JobError::Conflict(name.to_string()));
        }
        let running = jobs.values().filter(|j| j.is_running()).count();
        if running >= self.max_concurrent {
            log::debug!("Rejecting '{}': {} renders running", name, running);
            return Err(JobError::Saturated {
                max: self.max_concurrent,
            });
        }

        let job = RenderJob::start(name, source, renderer, self.store.clone())?;
        if let Some(mut previous) = jobs.insert(name.to_string(), job) {
            previous.join();
        }
        Ok(())
    }

    /// Current status of the job for `name`, or `None` if there is none.
    ///
    /// A terminal status is returned once before the job is reaped.
    pub fn status(&self, name: &str) -> Option<JobStatus> {
        let mut jobs = self.lock();
        let status = jobs.get(name).map(RenderJob::status);
        self.reap_locked(&mut jobs);
        status
    }

    /// Like [`status`](Self::status) but never reaps.
    pub fn peek(&self, name: &str) -> Option<JobStatus> {
        self.lock().get(name).map(RenderJob::status)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.lock().get(name).is_some_and(RenderJob::is_running)
    }

    pub fn running_count(&self) -> usize {
        self.lock().values().filter(|j| j.is_running()).count()
    }

    /// Drop every terminal job except finished reserved ones.
    pub fn reap(&self) {
        let mut jobs = self.lock();
        self.reap_locked(&mut jobs);
    }

    fn reap_locked(&self, jobs: &mut HashMap<String, RenderJob>) {
        let done: Vec<String> = jobs
            .iter()
            .filter(|(name, job)| match job.state() {
                JobState::Running => false,
                JobState::Finished => !self.reserved.contains(name.as_str()),
                JobState::Failed => true,
            })
            .map(|(name, _)| name.clone())
            .collect();

        for name in done {
            if let Some(mut job) = jobs.remove(&name) {
                job.join();
                log::debug!("Reaped render job '{}'", name);
            }
        }
    }

    /// Drop a finished job kept alive under a reserved name.
    /// Returns false if there was no finished job to release.
    pub fn release(&self, name: &str) -> bool {
        let mut jobs = self.lock();
        match jobs.get(name).map(RenderJob::state) {
            Some(JobState::Finished) => {
                if let Some(mut job) = jobs.remove(name) {
                    job.join();
                }
                true
            }
            _ => false,
        }
    }

    /// Wait for every job to finish and forget them all.
    pub fn shutdown(&self) {
        let drained: Vec<RenderJob> = self.lock().drain().map(|(_, job)| job).collect();
        if !drained.is_empty() {
            log::info!("Waiting for {} render job(s) to finish", drained.len());
        }
        for mut job in drained {
            job.join();
        }
    }
}
