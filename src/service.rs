//! Request/response front for the render and retrieval core.
//!
//! [`ArchiveService`] ties the job registry, the archive cache and the store
//! together the way a request handler would use them. Every response type
//! serializes to JSON.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::archive::{canonical_name, validate_name, ArchiveInfo, ArchiveStore};
use crate::cache::{ArchiveCache, CachedArchive, FrameWindow};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::jobs::{JobRegistry, JobState, JobStatus};
use crate::video::{archive_name_for, FfmpegSource, VideoSource};

/// Submission accepted; poll `status` or read once it finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Accepted { name: String },
}

/// Answer to an offset-mode frame request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameResponse {
    /// A render under this name is still running. Progress is a percentage.
    Processing { progress: f64 },
    Frames {
        frames: FrameWindow,
        fps: u32,
        original_width: u32,
        original_height: u32,
    },
}

/// Answer to a metadata request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InfoResponse {
    Processing { progress: f64 },
    Info(ArchiveInfo),
}

/// Answer to a cursor-mode frame request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CursorResponse {
    Processing {
        progress: f64,
    },
    Frames {
        reference_id: String,
        frames: FrameWindow,
        complete: bool,
        fps: u32,
    },
}

/// Job status as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResponse {
    NotRunning,
    Running { progress: f64 },
    Finished,
    Failed { error: String },
}

impl From<JobStatus> for StatusResponse {
    fn from(status: JobStatus) -> Self {
        match status.state {
            JobState::Running => StatusResponse::Running {
                progress: status.percent(),
            },
            JobState::Finished => StatusResponse::Finished,
            JobState::Failed => StatusResponse::Failed {
                error: status.error.unwrap_or_else(|| "unknown error".to_string()),
            },
        }
    }
}

/// A cached archive, or the progress of the render that will produce it.
enum Lookup {
    Processing(f64),
    Ready(Arc<CachedArchive>),
}

/// Owns the registry and the cache for one archive directory.
#[derive(Debug)]
pub struct ArchiveService {
    store: ArchiveStore,
    registry: JobRegistry,
    cache: ArchiveCache,
    default_width: u32,
}

impl ArchiveService {
    /// Build the service from configuration and preload the reserved names.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = ArchiveStore::new_initialized(&config.storage.dir)?;
        let reserved: Vec<String> = config
            .cache
            .preload
            .iter()
            .map(|n| canonical_name(n).to_string())
            .collect();

        let registry = JobRegistry::new(store.clone(), config.jobs.max_concurrent)
            .with_palette(config.render.palette(), config.render.invert)
            .with_reserved(reserved.iter().cloned());
        let cache = ArchiveCache::with_idle_timeout(store.clone(), config.cache.idle_timeout());

        let loaded = cache.preload(&reserved);
        log::info!(
            "Archive service ready in {} ({} of {} preloaded)",
            store.dir().display(),
            loaded,
            reserved.len()
        );

        Ok(Self {
            store,
            registry,
            cache,
            default_width: config.jobs.default_width,
        })
    }

    /// Assemble a service from already-built parts.
    pub fn from_parts(
        store: ArchiveStore,
        registry: JobRegistry,
        cache: ArchiveCache,
        default_width: u32,
    ) -> Self {
        Self {
            store,
            registry,
            cache,
            default_width,
        }
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ArchiveCache {
        &self.cache
    }

    /// Start rendering `source` into the archive `name`.
    ///
    /// `width` falls back to the configured default column count.
    pub fn submit<S>(&self, name: &str, source: S, width: Option<u32>) -> Result<SubmitResponse>
    where
        S: VideoSource + 'static,
    {
        validate_name(name)?;
        let name = canonical_name(name);
        let width = width.unwrap_or(self.default_width);

        self.registry.submit(name, source, width)?;
        log::info!("Accepted render '{}' at {} columns", name, width);
        Ok(SubmitResponse::Accepted {
            name: name.to_string(),
        })
    }

    /// Open a video file with ffmpeg and submit it under `name`, or under
    /// its file stem when no name is given.
    ///
    /// The name is checked before ffmpeg is started.
    pub fn submit_file(
        &self,
        path: &Path,
        name: Option<&str>,
        width: Option<u32>,
    ) -> Result<SubmitResponse> {
        let name = match name {
            Some(name) => name.to_string(),
            None => archive_name_for(path)
                .ok_or_else(|| Error::UnnamedSource(path.display().to_string()))?,
        };
        validate_name(&name)?;
        let source = FfmpegSource::open(path)?;
        log::info!("Probed {}: {}", path.display(), source.info());
        self.submit(&name, source, width)
    }

    fn lookup(&self, name: &str) -> Result<Lookup> {
        validate_name(name)?;
        let name = canonical_name(name);

        match self.registry.peek(name) {
            Some(status) if status.state == JobState::Running => {
                return Ok(Lookup::Processing(status.percent()));
            }
            Some(status)
                if status.state == JobState::Finished && self.registry.is_reserved(name) =>
            {
                // The cached copy predates the render that just finished
                let entry = self.cache.reload_pinned(name)?;
                self.registry.release(name);
                return Ok(Lookup::Ready(entry));
            }
            _ => {}
        }

        let pinned = self.registry.is_reserved(name);
        Ok(Lookup::Ready(self.cache.get(name, pinned)?))
    }

    /// Frames `[start, start + count)` of an archive, subject to the window
    /// rules in [`crate::cache::paginate`]. `count == 0` returns every frame.
    pub fn frames(&self, name: &str, start: usize, count: usize) -> Result<FrameResponse> {
        let entry = match self.lookup(name)? {
            Lookup::Processing(progress) => return Ok(FrameResponse::Processing { progress }),
            Lookup::Ready(entry) => entry,
        };

        let frames = if count == 0 {
            entry.paginate_all()
        } else {
            entry.paginate(start, count)
        };
        let archive = entry.archive();
        Ok(FrameResponse::Frames {
            frames,
            fps: archive.fps(),
            original_width: archive.original_width(),
            original_height: archive.original_height(),
        })
    }

    /// Frame count and header metadata, without frame bodies.
    pub fn info(&self, name: &str) -> Result<InfoResponse> {
        Ok(match self.lookup(name)? {
            Lookup::Processing(progress) => InfoResponse::Processing { progress },
            Lookup::Ready(entry) => InfoResponse::Info(entry.info()),
        })
    }

    /// Next `count` frames for a cursor. Without a `reference_id` a new
    /// cursor is opened at frame 0.
    pub fn advance(
        &self,
        name: &str,
        reference_id: Option<&str>,
        count: usize,
    ) -> Result<CursorResponse> {
        let entry = match self.lookup(name)? {
            Lookup::Processing(progress) => return Ok(CursorResponse::Processing { progress }),
            Lookup::Ready(entry) => entry,
        };

        let reference_id = match reference_id {
            Some(id) => id.to_string(),
            None => entry.open_cursor(),
        };
        let frames = entry.advance(&reference_id, count);
        let complete = entry.is_complete(&reference_id);
        Ok(CursorResponse::Frames {
            reference_id,
            frames,
            complete,
            fps: entry.archive().fps(),
        })
    }

    /// Status of the render job for `name`.
    pub fn status(&self, name: &str) -> StatusResponse {
        self.registry
            .status(canonical_name(name))
            .map(StatusResponse::from)
            .unwrap_or(StatusResponse::NotRunning)
    }

    /// Archive names present on disk.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.list()?)
    }

    /// Wait for running renders, then stop every cache timer.
    pub fn shutdown(&self) {
        self.registry.shutdown();
        self.cache.shutdown();
    }
}
