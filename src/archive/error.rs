//! Archive error types

use std::path::PathBuf;

/// Errors raised while reading or writing archives.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive '{name}' not found")]
    NotFound { name: String },

    #[error("archive '{}' is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("archive '{name}' has no frames")]
    EmptyArchive { name: String },

    #[error("invalid archive name '{0}'")]
    InvalidName(String),

    #[error("archive '{name}' has an invalid header '{header}'")]
    InvalidHeader { name: String, header: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ArchiveError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ArchiveError::NotFound { name: "cat".into() }.to_string(),
            "archive 'cat' not found"
        );
        assert_eq!(
            ArchiveError::corrupt("files/cat.txt.gz", "bad header").to_string(),
            "archive 'files/cat.txt.gz' is corrupt: bad header"
        );
        assert_eq!(
            ArchiveError::EmptyArchive { name: "cat".into() }.to_string(),
            "archive 'cat' has no frames"
        );
    }
}
