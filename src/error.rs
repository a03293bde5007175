// src/error.rs
//
// Error taxonomy for the capture, analysis and storage pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the library. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum ReedError {
    /// Input device missing or reporting a fault during capture
    #[error("audio device error: {0}")]
    Device(String),

    /// A persisted recording could not be decoded
    #[error("corrupt archive {}: {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    /// dB values need a calibrated baseline power
    #[error("no reference power: calibrate a baseline first")]
    MissingReferencePower,

    #[error("capture duration must be positive, got {0}")]
    InvalidDuration(f64),

    /// Sample count does not divide evenly into frames, or zero channels
    #[error("malformed PCM buffer: {0}")]
    Shape(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReedError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReedError>;
