//! Crate-wide error type.

use crate::archive::ArchiveError;
use crate::ascii::RenderError;
use crate::config::ConfigError;
use crate::jobs::JobError;
use crate::video::SourceError;

/// Any failure surfaced by the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot derive an archive name from '{0}'")]
    UnnamedSource(String),

    #[error("render of '{name}' failed: {reason}")]
    RenderFailed { name: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
