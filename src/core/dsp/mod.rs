//! Digital Signal Processing utilities

pub mod fft;
pub mod stats;

pub use fft::{fft_frequencies, fft_shift, magnitude_spectrum, SpectrumResult};
pub use stats::{amplitude_to_db, average_power, db_relative, peak_amplitude, rms, simpson};
