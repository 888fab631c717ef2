//! Error types

use std::path::PathBuf;
use thiserror::Error;

use crate::level::LevelId;

/// Errors from tracker operations
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("No level to play")]
    NoLevel,

    #[error("Unknown level {0:?}")]
    UnknownLevel(LevelId),

    #[error("Level {0:?} is locked")]
    Locked(LevelId),

    #[error("Failed to initialize level file {0}")]
    LevelInit(String),

    #[error("Replay error: {0}")]
    Replay(#[from] DemoError),
}

/// Errors from high-score storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Level set has no levels")]
    Empty,
}

/// Errors from replay recording and loading
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No recording in progress")]
    NotRecording,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl DemoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DemoError::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the recording simply doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DemoError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = DemoError::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());
        assert!(!DemoError::NotRecording.is_not_found());
    }

    #[test]
    fn test_replay_error_converts() {
        let err: ProgressError = DemoError::NotRecording.into();
        assert!(matches!(err, ProgressError::Replay(DemoError::NotRecording)));
        assert_eq!(err.to_string(), "Replay error: No recording in progress");
    }
}
