// src/core/threshold.rs
//
// Save threshold derived from a quiet-room baseline capture.

use log::{debug, info, warn};
use std::path::PathBuf;

use super::analyzer::SignalAnalyzer;
use super::buffer::PcmBuffer;
use crate::storage::{Fingerprint, Namespace, RecordingStore};
use crate::error::{ReedError, Result};

/// Default multiple of baseline RMS a capture must exceed to be saved
pub const DEFAULT_SENSITIVITY: f64 = 10.0;

/// Calibration state of a session
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThresholdState {
    /// No baseline captured or loaded; nothing is saved
    #[default]
    Unset,
    Set {
        /// Channel-0 baseline RMS times sensitivity
        rms_threshold: f64,
        /// Channel-0 average power of the baseline
        reference_power: f64,
    },
}

impl ThresholdState {
    pub fn is_set(&self) -> bool {
        matches!(self, ThresholdState::Set { .. })
    }

    pub fn rms_threshold(&self) -> Option<f64> {
        match self {
            ThresholdState::Set { rms_threshold, .. } => Some(*rms_threshold),
            ThresholdState::Unset => None,
        }
    }

    pub fn reference_power(&self) -> Option<f64> {
        match self {
            ThresholdState::Set { reference_power, .. } => Some(*reference_power),
            ThresholdState::Unset => None,
        }
    }

    /// `power` in dB relative to the baseline. A missing or zero reference is an error.
    pub fn db_relative(&self, power: f64) -> Result<f64> {
        match self.reference_power() {
            Some(reference) if reference > 0.0 => Ok(SignalAnalyzer::db_relative(power, reference)),
            _ => Err(ReedError::MissingReferencePower),
        }
    }

    /// True when any channel-0 sample is strictly above the threshold.
    ///
    /// Only channel 0 is examined and the comparison is signed. An unset
    /// threshold is never exceeded.
    pub fn exceeded_by(&self, buffer: &PcmBuffer) -> bool {
        match self.rms_threshold() {
            Some(threshold) => buffer.channel_iter(0).any(|s| s as f64 > threshold),
            None => false,
        }
    }
}

/// Turns baseline captures into a `ThresholdState` and keeps the baseline namespace current
#[derive(Debug, Clone, Copy)]
pub struct ThresholdCalibrator {
    sensitivity: f64,
}

impl ThresholdCalibrator {
    pub fn new(sensitivity: f64) -> Self {
        Self { sensitivity }
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Threshold and reference power for a baseline buffer
    pub fn derive(&self, analyzer: &SignalAnalyzer, baseline: &PcmBuffer) -> ThresholdState {
        let rms = analyzer.rms(baseline);
        let rms_threshold = rms.first().copied().unwrap_or(0.0) * self.sensitivity;
        let reference_power = analyzer.power(baseline, 0);

        debug!(
            "baseline rms {:?}, threshold {:.6}, reference power {:.3e}",
            rms, rms_threshold, reference_power
        );

        ThresholdState::Set {
            rms_threshold,
            reference_power,
        }
    }

    /// State from the newest stored baseline, or `Unset` if there is none
    pub fn load(&self, store: &RecordingStore, analyzer: &SignalAnalyzer) -> Result<ThresholdState> {
        match store.newest(&Namespace::Baseline)? {
            Some(entry) => {
                info!("setting initial threshold from {}", entry.path.display());
                let (baseline, _fingerprint) = store.load(&entry.path)?;
                Ok(self.derive(analyzer, &baseline))
            }
            None => {
                warn!("no baseline recording, calibrate to enable saving");
                Ok(ThresholdState::Unset)
            }
        }
    }

    /// Store this baseline, rotating any previous one into the archive once
    /// the new archive is safely written.
    pub fn persist(
        &self,
        store: &RecordingStore,
        baseline: &PcmBuffer,
        save_time: u64,
        state: &ThresholdState,
    ) -> Result<PathBuf> {
        let fingerprint = Fingerprint::new(
            None,
            save_time,
            baseline.sample_rate(),
            baseline.channels(),
            state.rms_threshold().unwrap_or(0.0),
        );
        store.replace_baseline(baseline, &fingerprint)
    }
}

impl Default for ThresholdCalibrator {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_only(samples: Vec<f32>) -> PcmBuffer {
        let right = vec![0.0; samples.len()];
        PcmBuffer::from_channels(&[samples, right], 44100).unwrap()
    }

    #[test]
    fn test_unset_never_exceeded() {
        let loud = left_only(vec![1.0; 16]);
        assert!(!ThresholdState::Unset.exceeded_by(&loud));
    }

    #[test]
    fn test_strictly_greater() {
        let state = ThresholdState::Set {
            rms_threshold: 0.5,
            reference_power: 1.0,
        };
        assert!(!state.exceeded_by(&left_only(vec![0.5, 0.1, -0.9])));
        assert!(state.exceeded_by(&left_only(vec![0.0, 0.5001])));
    }

    #[test]
    fn test_only_channel_zero_triggers() {
        let state = ThresholdState::Set {
            rms_threshold: 0.1,
            reference_power: 1.0,
        };
        let buf = PcmBuffer::from_channels(&[vec![0.0; 4], vec![0.9; 4]], 44100).unwrap();
        assert!(!state.exceeded_by(&buf));
    }

    #[test]
    fn test_silent_baseline_gives_zero_threshold() {
        let analyzer = SignalAnalyzer::new();
        let silence = PcmBuffer::silence(44100, 44100, 2).unwrap();
        let state = ThresholdCalibrator::new(10.0).derive(&analyzer, &silence);

        assert_eq!(state.rms_threshold(), Some(0.0));
        assert_eq!(state.reference_power(), Some(0.0));
        assert!(state.exceeded_by(&left_only(vec![0.0, 1e-6])));
        assert!(!state.exceeded_by(&left_only(vec![0.0, -1e-6])));
    }

    #[test]
    fn test_db_needs_reference() {
        assert!(matches!(
            ThresholdState::Unset.db_relative(1.0),
            Err(ReedError::MissingReferencePower)
        ));

        let zero = ThresholdState::Set {
            rms_threshold: 0.0,
            reference_power: 0.0,
        };
        assert!(matches!(zero.db_relative(1.0), Err(ReedError::MissingReferencePower)));

        let set = ThresholdState::Set {
            rms_threshold: 0.0,
            reference_power: 2.0,
        };
        assert_eq!(set.db_relative(2.0).unwrap(), 0.0);
    }

    #[test]
    fn test_failed_persist_keeps_previous_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path());
        let analyzer = SignalAnalyzer::new();
        let calibrator = ThresholdCalibrator::new(10.0);

        let quiet = left_only(vec![0.01, -0.01, 0.01, -0.01]);
        let state = calibrator.derive(&analyzer, &quiet);
        let first = calibrator.persist(&store, &quiet, 100, &state).unwrap();

        // A directory where the next archive would be staged makes the write fail
        std::fs::create_dir_all(dir.path().join(".staging").join("200.tar.gz")).unwrap();

        let loud = left_only(vec![0.5; 4]);
        let result = calibrator.persist(&store, &loud, 200, &calibrator.derive(&analyzer, &loud));
        assert!(matches!(result, Err(ReedError::Io { .. })));

        assert_eq!(store.newest(&Namespace::Baseline).unwrap().unwrap().path, first);
        assert!(store.list(&Namespace::Archive).unwrap().is_empty());
        assert_eq!(calibrator.load(&store, &analyzer).unwrap(), state);
    }

    #[test]
    fn test_threshold_scales_with_sensitivity() {
        let analyzer = SignalAnalyzer::new();
        let baseline = left_only(vec![0.01, -0.01, 0.01, -0.01]);

        let t1 = ThresholdCalibrator::new(1.0).derive(&analyzer, &baseline);
        let t10 = ThresholdCalibrator::new(10.0).derive(&analyzer, &baseline);

        let a = t1.rms_threshold().unwrap();
        let b = t10.rms_threshold().unwrap();
        assert!((a - 0.01).abs() < 1e-9);
        assert!((b - 0.1).abs() < 1e-8);
    }
}
