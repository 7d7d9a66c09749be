//! ArchiveStore - the directory of `{name}.txt.gz` archive files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::codec::{decode, encode, format_header};
use super::error::ArchiveError;
use super::types::VideoArchive;

/// File suffix of every archive.
pub const ARCHIVE_SUFFIX: &str = ".txt.gz";

/// Strip a recognized archive suffix, so `cat`, `cat.txt` and `cat.txt.gz`
/// all name the same archive.
pub fn canonical_name(name: &str) -> &str {
    name.strip_suffix(ARCHIVE_SUFFIX)
        .or_else(|| name.strip_suffix(".txt"))
        .unwrap_or(name)
}

/// Reject names that are empty or would escape the archive directory.
pub fn validate_name(name: &str) -> Result<(), ArchiveError> {
    let base = canonical_name(name);
    let bad = base.is_empty()
        || base == "."
        || base == ".."
        || base.contains(['/', '\\'])
        || base.contains('\0');
    if bad {
        Err(ArchiveError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Reads and writes archives under one directory.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    /// Create a store over `dir`.
    /// Does not create the directory - call `ensure_dir_exists()` to create it.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store and ensure its directory exists.
    /// This is the preferred constructor for production use.
    pub fn new_initialized(dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let store = Self::new(dir);
        store.ensure_dir_exists()?;
        Ok(store)
    }

    /// Ensure the archive directory exists, creating it if necessary.
    pub fn ensure_dir_exists(&self) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an archive called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", canonical_name(name), ARCHIVE_SUFFIX))
    }

    /// Find the file backing `name`: the name as given, then with the archive
    /// suffix applied.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ArchiveError> {
        validate_name(name)?;
        [self.dir.join(name), self.path_for(name)]
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ArchiveError::NotFound {
                name: name.to_string(),
            })
    }

    /// Whether an archive file exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Load and decode an archive.
    ///
    /// # Errors
    /// * `ArchiveError::NotFound` - No file for `name`
    /// * `ArchiveError::Corrupt` - The file can't be decoded
    /// * `ArchiveError::EmptyArchive` - The file decodes to zero frames
    pub fn read(&self, name: &str) -> Result<VideoArchive, ArchiveError> {
        let path = self.resolve(name)?;
        let file = File::open(&path)?;
        let (header, frames) = decode(BufReader::new(file), &path)?;

        let base = canonical_name(name);
        VideoArchive::new(base, header, frames).ok_or_else(|| ArchiveError::EmptyArchive {
            name: base.to_string(),
        })
    }

    /// Write an archive, replacing any previous file under the same name.
    ///
    /// The data goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers never observe a partial archive.
    /// A header with a zero field is refused before anything touches disk.
    pub fn write(&self, archive: &VideoArchive) -> Result<PathBuf, ArchiveError> {
        validate_name(archive.name())?;
        let header = archive.header();
        if !header.is_valid() {
            return Err(ArchiveError::InvalidHeader {
                name: archive.name().to_string(),
                header: format_header(&header).trim_end().to_string(),
            });
        }
        self.ensure_dir_exists()?;
        let path = self.path_for(archive.name());

        log::info!(
            "[{}] Saving archive with {} frames to {}",
            archive.name(),
            archive.frame_count(),
            path.display()
        );

        let tmp = NamedTempFile::new_in(&self.dir)?;
        let writer = encode(archive, BufWriter::new(tmp.as_file()))?;
        writer.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ArchiveError::Io(e.error))?;

        if let Ok(meta) = std::fs::metadata(&path) {
            log::debug!("[{}] Archive is {} bytes compressed", archive.name(), meta.len());
        }

        Ok(path)
    }

    /// List archive names in the directory, sorted.
    pub fn list(&self) -> Result<Vec<String>, ArchiveError> {
        let mut names = Vec::new();

        if !self.dir.exists() {
            return Ok(names);
        }

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.strip_suffix(ARCHIVE_SUFFIX))
                .filter(|n| !n.is_empty())
            {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove an archive file.
    /// Returns true if a file was removed, false if it didn't exist.
    pub fn remove(&self, name: &str) -> Result<bool, ArchiveError> {
        match self.resolve(name) {
            Ok(path) => {
                std::fs::remove_file(path)?;
                Ok(true)
            }
            Err(ArchiveError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
