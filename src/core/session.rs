// src/core/session.rs
//
// One reed's capture → analyse → threshold → save workflow.

use log::{info, warn};
use std::path::PathBuf;

use super::analyzer::SignalAnalyzer;
use super::buffer::PcmBuffer;
use super::capture::{AudioCapture, AudioSource, CpalSource};
use super::dsp::SpectrumResult;
use super::threshold::{ThresholdCalibrator, ThresholdState};
use crate::config::SessionConfig;
use crate::error::{ReedError, Result};
use crate::storage::{epoch_nanos, Fingerprint, Namespace, RecordingEntry, RecordingStore};

/// Reed id used when none is chosen. Calibration runs under it; baselines
/// are not bound to a reed.
pub const DEFAULT_REED: &str = "0";

/// What happened to a capture after the threshold test
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Channel 0 went above the threshold; the recording was stored here
    Saved(PathBuf),
    BelowThreshold,
    /// No baseline yet. Calibrate before recordings can be saved.
    ThresholdUnset,
}

impl Trigger {
    pub fn saved(&self) -> bool {
        matches!(self, Trigger::Saved(_))
    }
}

/// Result of one `listen` call
#[derive(Debug)]
pub struct Listen<'a> {
    pub buffer: &'a PcmBuffer,
    pub save_time: u64,
    pub trigger: Trigger,
}

/// Result of one `calibrate` call
#[derive(Debug, Clone)]
pub struct Calibration {
    pub state: ThresholdState,
    pub path: PathBuf,
}

pub struct ReedSession<S> {
    id: String,
    namespace: Namespace,
    config: SessionConfig,
    capture: AudioCapture<S>,
    analyzer: SignalAnalyzer,
    store: RecordingStore,
    threshold: ThresholdState,
    last: Option<PcmBuffer>,
}

impl ReedSession<CpalSource> {
    /// Session recording from the default input device
    pub fn open(id: impl Into<String>, config: SessionConfig) -> Result<Self> {
        Self::new(id, config, CpalSource::new())
    }
}

impl<S: AudioSource> ReedSession<S> {
    /// Start tracking a reed. The newest stored baseline, if any, sets the threshold.
    pub fn new(id: impl Into<String>, config: SessionConfig, source: S) -> Result<Self> {
        config.validate()?;

        let id = id.into();
        let namespace = Namespace::subject(id.clone())?;
        let store = RecordingStore::new(&config.data_root);
        let analyzer = SignalAnalyzer::new();
        let threshold = ThresholdCalibrator::new(config.sensitivity).load(&store, &analyzer)?;
        let capture = AudioCapture::new(source).with_guard_delay(config.guard_delay());

        info!("session for reed {} ({})", id, if threshold.is_set() { "calibrated" } else { "uncalibrated" });

        Ok(Self {
            id,
            namespace,
            config,
            capture,
            analyzer,
            store,
            threshold,
            last: None,
        })
    }

    /// Hand the device and settings over to a different reed
    pub fn switch_reed(self, id: impl Into<String>) -> Result<Self> {
        Self::new(id, self.config, self.capture.into_source())
    }

    fn record(&mut self) -> Result<PcmBuffer> {
        self.capture
            .capture(self.config.duration_secs, self.config.sample_rate, self.config.channels)
    }

    /// Capture once and save into this reed's namespace if channel 0 crosses the threshold
    pub fn listen(&mut self) -> Result<Listen<'_>> {
        let buffer = self.record()?;
        let save_time = epoch_nanos();

        let trigger = match self.threshold {
            ThresholdState::Unset => {
                warn!("threshold unset, recording not saved; calibrate first");
                Trigger::ThresholdUnset
            }
            ThresholdState::Set { rms_threshold, .. } => {
                if self.threshold.exceeded_by(&buffer) {
                    let fingerprint = Fingerprint::new(
                        Some(self.id.clone()),
                        save_time,
                        buffer.sample_rate(),
                        buffer.channels(),
                        rms_threshold,
                    );
                    Trigger::Saved(self.store.save(&self.namespace, &buffer, &fingerprint)?)
                } else {
                    info!("capture stayed below threshold {:.6}", rms_threshold);
                    Trigger::BelowThreshold
                }
            }
        };

        let buffer = self.last.insert(buffer);
        Ok(Listen {
            buffer,
            save_time,
            trigger,
        })
    }

    /// Record a quiet-room baseline and derive a new threshold from it
    pub fn calibrate(&mut self, sensitivity: f64) -> Result<Calibration> {
        if !(sensitivity >= 0.0) || !sensitivity.is_finite() {
            return Err(ReedError::InvalidConfig(format!(
                "sensitivity must be a non-negative number, got {}",
                sensitivity
            )));
        }

        let buffer = self.record()?;
        let save_time = epoch_nanos();

        let calibrator = ThresholdCalibrator::new(sensitivity);
        let state = calibrator.derive(&self.analyzer, &buffer);
        let path = calibrator.persist(&self.store, &buffer, save_time, &state)?;

        self.config.sensitivity = sensitivity;
        self.threshold = state;
        self.last = Some(buffer);

        Ok(Calibration { state, path })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    pub fn threshold(&self) -> ThresholdState {
        self.threshold
    }

    pub fn last_buffer(&self) -> Option<&PcmBuffer> {
        self.last.as_ref()
    }

    pub fn last_rms(&self) -> Option<Vec<f64>> {
        self.last.as_ref().map(|b| self.analyzer.rms(b))
    }

    /// Channel-0 average power of the last capture
    pub fn last_power(&self) -> Option<f64> {
        self.last.as_ref().map(|b| self.analyzer.power(b, 0))
    }

    /// Last capture's power in dB relative to the baseline.
    ///
    /// `Ok(None)` before anything was captured; `MissingReferencePower` when
    /// the baseline is unset or has zero power.
    pub fn last_db(&self) -> Result<Option<f64>> {
        let Some(power) = self.last_power() else {
            return Ok(None);
        };
        self.db_of(power).map(Some)
    }

    /// dB of `power` relative to the baseline reference
    pub fn db_of(&self, power: f64) -> Result<f64> {
        self.threshold.db_relative(power)
    }

    pub fn last_spectrum(&mut self) -> Option<SpectrumResult> {
        let buffer = self.last.as_ref()?;
        Some(self.analyzer.spectrum(buffer))
    }

    /// Everything saved for this reed, oldest first
    pub fn recordings(&self) -> Result<Vec<RecordingEntry>> {
        self.store.list(&self.namespace)
    }
}
