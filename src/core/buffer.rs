// src/core/buffer.rs
//
// Captured PCM data. Interleaved f32 samples, immutable once built.

use crate::error::{ReedError, Result};

/// CD-quality sampling rate used for every capture
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Stereo capture
pub const DEFAULT_CHANNELS: usize = 2;

/// Container for one capture
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Interleaved samples, nominally in [-1.0, 1.0]
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl PcmBuffer {
    /// Wrap interleaved samples. The sample count must be a whole number of frames.
    pub fn from_interleaved(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(ReedError::Shape("zero channels".to_string()));
        }
        if sample_rate == 0 {
            return Err(ReedError::Shape("zero sample rate".to_string()));
        }
        if samples.len() % channels != 0 {
            return Err(ReedError::Shape(format!(
                "{} samples is not a multiple of {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Build from per-channel vectors of equal length
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Result<Self> {
        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if channels.iter().any(|c| c.len() != frames) {
            return Err(ReedError::Shape("channels differ in length".to_string()));
        }

        let mut samples = Vec::with_capacity(frames * channels.len());
        for i in 0..frames {
            for ch in channels {
                samples.push(ch[i]);
            }
        }

        Self::from_interleaved(samples, sample_rate, channels.len())
    }

    pub fn silence(frames: usize, sample_rate: u32, channels: usize) -> Result<Self> {
        Self::from_interleaved(vec![0.0; frames * channels], sample_rate, channels)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Iterate one channel without copying
    pub fn channel_iter(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        let skip = if channel < self.channels { channel } else { self.samples.len() };
        self.samples.iter().skip(skip).step_by(self.channels).copied()
    }

    /// Extract one channel. Out-of-range channels yield an empty vector.
    pub fn channel(&self, channel: usize) -> Vec<f32> {
        self.channel_iter(channel).collect()
    }

    /// Largest signed sample on a channel
    pub fn channel_max(&self, channel: usize) -> Option<f32> {
        self.channel_iter(channel).reduce(f32::max)
    }
}
