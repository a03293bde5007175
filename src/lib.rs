//! reedrev - Track how a reed's sound develops over time
//!
//! Captures short stereo samples, compares them against a threshold
//! calibrated from a quiet-room baseline, and archives the ones that
//! cross it together with a metadata fingerprint for later review.
//!
//! ## Module Structure
//!
//! - `core` - Capture, signal statistics, thresholding and `ReedSession`
//! - `storage` - Recording archives, fingerprints and namespaces
//! - `config` - Session settings
//! - `cli` - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reedrev::{ReedSession, SessionConfig, Trigger};
//!
//! let mut session = ReedSession::open("12", SessionConfig::load_default()?)?;
//! session.calibrate(10.0)?;              // quiet room
//!
//! let take = session.listen()?;          // play the reed
//! if let Trigger::Saved(path) = &take.trigger {
//!     println!("saved {}", path.display());
//! }
//! println!("{:.1} dB over the room", session.last_db()?.unwrap_or_default());
//! ```
//!
//! ## Data Layout
//!
//! | Directory              | Contents                                  |
//! |------------------------|-------------------------------------------|
//! | `baseline/`            | Most recent calibration only              |
//! | `subject_<id>/`        | Every saved recording for one reed        |
//! | `archive/<stamp>/`     | Baseline directories rotated out          |
//! | `.staging/`            | New baseline while it is being written    |

// Capture and analysis
pub mod core;

// Archive format and directory namespaces
pub mod storage;

// Settings
pub mod config;

// Command-line interface
pub mod cli;

pub mod error;

pub use config::SessionConfig;
pub use core::{
    AudioCapture, AudioSource, Calibration, CpalSource, Listen, PcmBuffer, ReedSession,
    SignalAnalyzer, SpectrumResult, ThresholdCalibrator, ThresholdState, Trigger,
};
pub use error::{ReedError, Result};
pub use storage::{Fingerprint, Namespace, RecordingEntry, RecordingStore};
