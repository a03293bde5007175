// src/core/analyzer.rs
//
// Signal statistics for a captured buffer: per-channel RMS, time-domain
// average power, and the duration-normalised magnitude spectrum.

use rustfft::FftPlanner;

use super::buffer::PcmBuffer;
use super::dsp::{self, SpectrumResult};

/// Stateless apart from a cached FFT planner
pub struct SignalAnalyzer {
    planner: FftPlanner<f64>,
}

impl SignalAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// RMS of every channel, in channel order
    pub fn rms(&self, buffer: &PcmBuffer) -> Vec<f64> {
        (0..buffer.channels())
            .map(|ch| dsp::rms(buffer.channel_iter(ch)))
            .collect()
    }

    /// Average power of one channel. Out-of-range channels have zero power.
    pub fn power(&self, buffer: &PcmBuffer, channel: usize) -> f64 {
        dsp::average_power(&buffer.channel(channel), buffer.sample_rate())
    }

    /// Zero-centred magnitude spectrum of each channel, divided by the
    /// capture duration so captures of different length compare directly.
    pub fn spectrum(&mut self, buffer: &PcmBuffer) -> SpectrumResult {
        let n = buffer.frames();
        let mut freq_axis = dsp::fft_frequencies(n, buffer.sample_rate());
        dsp::fft_shift(&mut freq_axis);

        let duration = buffer.duration_secs();
        let magnitudes = (0..buffer.channels())
            .map(|ch| {
                let mut mags = dsp::magnitude_spectrum(&mut self.planner, &buffer.channel(ch));
                dsp::fft_shift(&mut mags);
                if duration > 0.0 {
                    mags.iter_mut().for_each(|m| *m /= duration);
                }
                mags
            })
            .collect();

        SpectrumResult {
            freq_axis,
            magnitudes,
        }
    }

    /// `10 * log10(power / reference_power)`; see `ReedSession::last_db` for the guarded form
    pub fn db_relative(power: f64, reference_power: f64) -> f64 {
        dsp::db_relative(power, reference_power)
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, amp: f64, frames: usize, fs: u32) -> Vec<f32> {
        (0..frames)
            .map(|i| (amp * (2.0 * PI * freq * i as f64 / fs as f64).sin()) as f32)
            .collect()
    }

    #[test]
    fn test_rms_per_channel() {
        let left = tone(440.0, 1.0, 44100, 44100);
        let right = vec![0.0; 44100];
        let buf = PcmBuffer::from_channels(&[left, right], 44100).unwrap();

        let rms = SignalAnalyzer::new().rms(&buf);
        assert_eq!(rms.len(), 2);
        assert!((rms[0] - 1.0 / 2.0f64.sqrt()).abs() < 1e-4);
        assert_eq!(rms[1], 0.0);
    }

    #[test]
    fn test_power_of_sine_is_half_amplitude_squared() {
        let buf = PcmBuffer::from_channels(&[tone(440.0, 0.5, 44100, 44100), vec![0.0; 44100]], 44100)
            .unwrap();
        let power = SignalAnalyzer::new().power(&buf, 0);
        assert!((power - 0.125).abs() < 1e-3);
    }

    #[test]
    fn test_spectrum_peak_and_density() {
        let fs = 8000;
        let frames = 8000;
        let buf = PcmBuffer::from_channels(&[tone(1000.0, 1.0, frames, fs), tone(250.0, 1.0, frames, fs)], fs)
            .unwrap();

        let spectrum = SignalAnalyzer::new().spectrum(&buf);
        assert_eq!(spectrum.len(), frames);
        assert_eq!(spectrum.magnitudes.len(), 2);
        assert_eq!(spectrum.freq_axis[spectrum.dc_index()], 0.0);

        assert_eq!(spectrum.peak_frequency(0), Some(1000.0));
        assert_eq!(spectrum.peak_frequency(1), Some(250.0));

        // |X[k]| = N/2 for a unit sine on an exact bin, divided by 1 s of capture
        let bin = spectrum.dc_index() + 1000;
        assert!((spectrum.magnitudes[0][bin] - frames as f64 / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_density_independent_of_duration() {
        let fs = 8000;
        let short = PcmBuffer::from_channels(&[tone(500.0, 1.0, 4000, fs), vec![0.0; 4000]], fs).unwrap();
        let long = PcmBuffer::from_channels(&[tone(500.0, 1.0, 8000, fs), vec![0.0; 8000]], fs).unwrap();

        let mut analyzer = SignalAnalyzer::new();
        let a = analyzer.spectrum(&short);
        let b = analyzer.spectrum(&long);

        let peak_a = a.magnitudes[0].iter().cloned().fold(0.0, f64::max);
        let peak_b = b.magnitudes[0].iter().cloned().fold(0.0, f64::max);
        assert!((peak_a - peak_b).abs() < 1e-3);
    }

    #[test]
    fn test_positive_band() {
        let buf = PcmBuffer::silence(10, 10, 2).unwrap();
        let spectrum = SignalAnalyzer::new().spectrum(&buf);
        // shifted axis: -5..=4
        let band = spectrum.positive_band(3.0);
        assert_eq!(band, 5..9);
        assert_eq!(&spectrum.freq_axis[band], &[0.0, 1.0, 2.0, 3.0]);
    }
}
