//! ascii-reel library crate.
//!
//! Renders videos into gzip-compressed ASCII-art archives on background
//! threads, and serves those archives back in paginated windows from an
//! idle-expiring in-memory cache.

pub mod archive;
pub mod ascii;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod service;
pub mod video;

pub use error::{Error, Result};
