// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a processing run.
///
/// Noisy or empty detections are never errors; they resolve to "no
/// possession" for the frame. Only I/O, records that are not JSON, report
/// output and upstream detector failures end up here.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed detection record at {location}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize report for {path}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Upstream detector failed: {0}")]
    Upstream(String),

    #[error("Run cancelled after {frames_processed} frames")]
    Cancelled { frames_processed: u64 },
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(location: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            location: location.into(),
            source,
        }
    }
}
