//! Capture, analysis, thresholding and the per-reed session that ties them together

pub mod analyzer;
pub mod buffer;
pub mod capture;
pub mod dsp;
pub mod session;
pub mod threshold;

pub use analyzer::SignalAnalyzer;
pub use buffer::{PcmBuffer, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
pub use capture::{list_input_devices, AudioCapture, AudioSource, CpalSource, DEFAULT_GUARD_DELAY};
pub use dsp::SpectrumResult;
pub use session::{Calibration, Listen, ReedSession, Trigger, DEFAULT_REED};
pub use threshold::{ThresholdCalibrator, ThresholdState, DEFAULT_SENSITIVITY};
