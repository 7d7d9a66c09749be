//! Background render jobs.
//!
//! Each accepted submission runs on its own named thread and publishes its
//! progress through atomics, so status queries never wait on a render.

mod job;
mod registry;

pub use job::{JobState, JobStatus, RenderJob};
pub use registry::{JobError, JobRegistry, DEFAULT_MAX_CONCURRENT};
