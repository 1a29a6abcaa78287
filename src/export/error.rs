//! Error types for export writing.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while writing export files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Destination exists and overwriting is disabled.
    #[error("destination already exists: {path}\n  Suggestion: pass --overwrite or choose another output directory")]
    DestinationExists {
        /// The existing file.
        path: PathBuf,
    },

    /// Filesystem failure opening or writing the destination.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV encoding failed: {source}")]
    Csv {
        /// Underlying csv error.
        #[source]
        source: csv::Error,
    },

    /// JSON serialization failed.
    #[error("JSON encoding failed: {source}")]
    Json {
        /// Underlying `serde_json` error.
        #[source]
        source: serde_json::Error,
    },
}

impl WriteError {
    /// Creates a destination-exists error.
    pub fn destination_exists(path: impl AsRef<Path>) -> Self {
        Self::DestinationExists {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates an IO error for `path`.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wraps a csv error.
    #[must_use]
    pub fn csv(source: csv::Error) -> Self {
        Self::Csv { source }
    }

    /// Wraps a JSON error.
    #[must_use]
    pub fn json(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_exists_display_includes_path_and_hint() {
        let err = WriteError::destination_exists("/tmp/out/Cat.csv");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/Cat.csv"));
        assert!(msg.contains("--overwrite"));
    }

    #[test]
    fn test_io_error_display() {
        let err = WriteError::io(
            "/readonly/x.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/readonly/x.json"));
        assert!(err.to_string().contains("denied"));
    }
}
