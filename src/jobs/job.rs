//! A single background render: source video in, archive file out.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::Serialize;

use crate::archive::{ArchiveHeader, ArchiveStore, VideoArchive};
use crate::ascii::FrameRenderer;
use crate::video::VideoSource;

/// Lifecycle of a render job. Only `Running` ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Finished,
    Failed,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => JobState::Running,
            1 => JobState::Finished,
            _ => JobState::Failed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            JobState::Running => 0,
            JobState::Finished => 1,
            JobState::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != JobState::Running
    }
}

/// Point-in-time view of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    /// Fraction of frames processed, in `[0.0, 1.0]`.
    pub progress: f64,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    /// Progress as a percentage rounded to two decimals.
    pub fn percent(&self) -> f64 {
        (self.progress * 10_000.0).round() / 100.0
    }
}

/// State shared between the worker thread and status readers.
#[derive(Debug)]
struct Progress {
    state: AtomicU8,
    processed: AtomicU64,
    total: u64,
    error: Mutex<Option<String>>,
}

impl Progress {
    fn fail(&self, reason: String) {
        if let Ok(mut slot) = self.error.lock() {
            *slot = Some(reason);
        }
        self.state.store(JobState::Failed.as_u8(), Ordering::Release);
    }

    fn snapshot(&self) -> JobStatus {
        let state = JobState::from_u8(self.state.load(Ordering::Acquire));
        let progress = match state {
            JobState::Finished => 1.0,
            _ if self.total == 0 => 0.0,
            _ => (self.processed.load(Ordering::Relaxed) as f64 / self.total as f64).min(1.0),
        };
        let error = match state {
            JobState::Failed => self.error.lock().ok().and_then(|e| e.clone()),
            _ => None,
        };
        JobStatus {
            progress,
            state,
            error,
        }
    }
}

/// Handle to a render running on its own thread.
///
/// The thread owns the source and the renderer; this handle only reads the
/// shared progress cell.
#[derive(Debug)]
pub struct RenderJob {
    name: String,
    progress: Arc<Progress>,
    handle: Option<JoinHandle<()>>,
}

impl RenderJob {
    /// Spawn the render thread and return immediately.
    ///
    /// The caller has already checked that the source reports a non-zero
    /// frame count.
    pub fn start<S>(
        name: &str,
        source: S,
        renderer: FrameRenderer,
        store: ArchiveStore,
    ) -> std::io::Result<Self>
    where
        S: VideoSource + 'static,
    {
        let progress = Arc::new(Progress {
            state: AtomicU8::new(JobState::Running.as_u8()),
            processed: AtomicU64::new(0),
            total: source.info().frame_count,
            error: Mutex::new(None),
        });

        let worker_progress = Arc::clone(&progress);
        let worker_name = name.to_string();
        let handle = thread::Builder::new()
            .name(format!("render-{name}"))
            .spawn(move || run(worker_name, source, renderer, store, worker_progress))?;

        Ok(Self {
            name: name.to_string(),
            progress,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> JobStatus {
        self.progress.snapshot()
    }

    pub fn state(&self) -> JobState {
        JobState::from_u8(self.progress.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == JobState::Running
    }

    /// Block until the render thread exits.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[{}] Render thread panicked", self.name);
                if self.is_running() {
                    self.progress.fail("render thread panicked".to_string());
                }
            }
        }
    }
}

fn run<S: VideoSource>(
    name: String,
    source: S,
    renderer: FrameRenderer,
    store: ArchiveStore,
    progress: Arc<Progress>,
) {
    let started = Instant::now();
    log::info!(
        "[{}] Render started: {} at {} columns",
        name,
        source.info(),
        renderer.target_width()
    );

    match render_archive(&name, source, renderer, &store, &progress) {
        Ok(frames) => {
            progress
                .state
                .store(JobState::Finished.as_u8(), Ordering::Release);
            log::info!(
                "[{}] Render finished: {} frames in {:.1}s",
                name,
                frames,
                started.elapsed().as_secs_f64()
            );
        }
        Err(reason) => {
            log::warn!("[{}] Render failed: {}", name, reason);
            progress.fail(reason);
        }
    }
}

/// Decode, render and persist every frame. Returns the frame count.
fn render_archive<S: VideoSource>(
    name: &str,
    mut source: S,
    mut renderer: FrameRenderer,
    store: &ArchiveStore,
    progress: &Progress,
) -> Result<usize, String> {
    let info = *source.info();
    let header = ArchiveHeader {
        original_width: info.width,
        original_height: info.height,
        fps: info.fps,
    };

    let mut frames = Vec::with_capacity(info.frame_count.min(4096) as usize);
    while let Some(raw) = source
        .next_frame()
        .map_err(|e| format!("decoder error: {e}"))?
    {
        let frame = renderer
            .render(&raw)
            .map_err(|e| format!("render error at frame {}: {e}", frames.len()))?;
        frames.push(frame);

        let done = progress.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 100 == 0 {
            log::debug!("[{}] Rendered {}/{} frames", name, done, progress.total);
        }
    }

    let count = frames.len();
    let archive =
        VideoArchive::new(name, header, frames).ok_or_else(|| "no frames decoded".to_string())?;
    store
        .write(&archive)
        .map_err(|e| format!("write failed: {e}"))?;
    Ok(count)
}
