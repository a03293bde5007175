//! Time-domain statistics: RMS, Simpson quadrature, average power, dB ratios

/// Compute RMS (Root Mean Square).
///
/// The signal is assumed zero-mean, so no mean is subtracted.
pub fn rms<I>(samples: I) -> f64
where
    I: IntoIterator<Item = f32>,
{
    let (sum_sq, count) = samples
        .into_iter()
        .fold((0.0f64, 0usize), |(acc, n), s| (acc + (s as f64) * (s as f64), n + 1));

    if count == 0 {
        return 0.0;
    }

    (sum_sq / count as f64).sqrt()
}

/// Compute peak amplitude
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Composite Simpson's rule over uniformly spaced samples.
///
/// With an even number of samples (odd interval count) the result is the
/// average of two estimates: Simpson over the first N-1 points plus a
/// trapezoid on the last interval, and a trapezoid on the first interval
/// plus Simpson over the last N-1 points.
pub fn simpson(y: &[f64], dx: f64) -> f64 {
    let n = y.len();
    match n {
        0 | 1 => 0.0,
        2 => 0.5 * dx * (y[0] + y[1]),
        _ if n % 2 == 1 => simpson_odd(y, dx),
        _ => {
            let head = simpson_odd(&y[..n - 1], dx) + 0.5 * dx * (y[n - 2] + y[n - 1]);
            let tail = 0.5 * dx * (y[0] + y[1]) + simpson_odd(&y[1..], dx);
            0.5 * (head + tail)
        }
    }
}

/// Simpson's rule for an odd sample count (even number of intervals)
fn simpson_odd(y: &[f64], dx: f64) -> f64 {
    debug_assert!(y.len() % 2 == 1);
    if y.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for pair in (0..y.len() - 2).step_by(2) {
        sum += y[pair] + 4.0 * y[pair + 1] + y[pair + 2];
    }
    sum * dx / 3.0
}

/// Average power: integral of |x|^2 over the capture divided by its duration.
pub fn average_power(signal: &[f32], sample_rate: u32) -> f64 {
    if signal.is_empty() || sample_rate == 0 {
        return 0.0;
    }

    let squared: Vec<f64> = signal.iter().map(|&s| (s as f64).abs().powi(2)).collect();
    let dx = 1.0 / sample_rate as f64;
    let duration = signal.len() as f64 / sample_rate as f64;

    simpson(&squared, dx) / duration
}

/// `10 * log10(power / reference)`. Callers guard against a zero reference.
pub fn db_relative(power: f64, reference_power: f64) -> f64 {
    10.0 * (power / reference_power).log10()
}

/// Convert amplitude to dB (relative to 1.0)
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    if amplitude > 1e-10 {
        20.0 * amplitude.log10()
    } else {
        -200.0
    }
}
