//! Full-length FFT with a zero-centred frequency axis

use rustfft::{num_complex::Complex, FftPlanner};

/// Frequency axis and per-channel magnitude density for one buffer.
///
/// Both axis and magnitudes are shifted so DC sits at index `len / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumResult {
    /// Signed bin frequencies in Hz, ascending
    pub freq_axis: Vec<f64>,
    /// One magnitude vector per channel, each `freq_axis.len()` long
    pub magnitudes: Vec<Vec<f64>>,
}

impl SpectrumResult {
    pub fn len(&self) -> usize {
        self.freq_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq_axis.is_empty()
    }

    /// Index of the DC bin in the shifted arrays
    pub fn dc_index(&self) -> usize {
        self.freq_axis.len() / 2
    }

    /// Index range covering 0 Hz up to and including `max_hz`
    pub fn positive_band(&self, max_hz: f64) -> std::ops::Range<usize> {
        let start = self.dc_index();
        let end = self.freq_axis[start..]
            .iter()
            .position(|&f| f > max_hz)
            .map(|offset| start + offset)
            .unwrap_or(self.freq_axis.len());
        start..end
    }

    /// Strongest non-negative frequency on a channel
    pub fn peak_frequency(&self, channel: usize) -> Option<f64> {
        self.peak_in(channel, self.dc_index()..self.len())
    }

    /// Strongest frequency between 0 Hz and `max_hz` inclusive
    pub fn peak_frequency_below(&self, channel: usize, max_hz: f64) -> Option<f64> {
        self.peak_in(channel, self.positive_band(max_hz))
    }

    fn peak_in(&self, channel: usize, band: std::ops::Range<usize>) -> Option<f64> {
        let start = band.start;
        self.magnitudes
            .get(channel)?
            .get(band)?
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| self.freq_axis[start + i])
    }
}

/// Bin frequencies in FFT order: `[0, 1, ..., (n-1)/2, -(n/2), ..., -1] * fs / n`
pub fn fft_frequencies(n: usize, sample_rate: u32) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = sample_rate as f64 / n as f64;
    let positive = (n - 1) / 2 + 1;

    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 * scale
            } else {
                -((n - k) as f64) * scale
            }
        })
        .collect()
}

/// Move the zero-frequency bin to the centre of the array
pub fn fft_shift<T>(data: &mut [T]) {
    let n = data.len();
    data.rotate_right(n / 2);
}

/// Magnitude spectrum over the whole signal, no windowing, zero-padding or shifting
pub fn magnitude_spectrum(planner: &mut FftPlanner<f64>, signal: &[f32]) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let fft = planner.plan_fft_forward(signal.len());
    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .map(|&s| Complex::new(s as f64, 0.0))
        .collect();

    fft.process(&mut buffer);

    buffer.iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_frequencies_even() {
        let f = fft_frequencies(4, 4);
        assert_eq!(f, vec![0.0, 1.0, -2.0, -1.0]);
    }

    #[test]
    fn test_fft_frequencies_odd() {
        let f = fft_frequencies(5, 5);
        assert_eq!(f, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_shift_centres_dc() {
        let mut even = fft_frequencies(4, 4);
        fft_shift(&mut even);
        assert_eq!(even, vec![-2.0, -1.0, 0.0, 1.0]);

        let mut odd = fft_frequencies(5, 5);
        fft_shift(&mut odd);
        assert_eq!(odd, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_peak_below_ignores_higher_bins() {
        let mut freq_axis = fft_frequencies(8, 8);
        fft_shift(&mut freq_axis);
        // axis -4..=3, strongest bin at 3 Hz, runner-up at 1 Hz
        let spectrum = SpectrumResult {
            freq_axis,
            magnitudes: vec![vec![9.0, 0.0, 0.0, 0.0, 0.0, 2.0, 1.0, 5.0]],
        };

        assert_eq!(spectrum.peak_frequency(0), Some(3.0));
        assert_eq!(spectrum.peak_frequency_below(0, 2.0), Some(1.0));
        assert_eq!(spectrum.peak_frequency_below(1, 2.0), None);
    }

    #[test]
    fn test_dc_magnitude() {
        let mut planner = FftPlanner::new();
        let mags = magnitude_spectrum(&mut planner, &[1.0; 8]);
        assert!((mags[0] - 8.0).abs() < 1e-9);
        assert!(mags[1..].iter().all(|m| m.abs() < 1e-9));
    }
}
