//! Output formatting for CLI results

use colorful::Colorful;

use crate::core::dsp::{amplitude_to_db, peak_amplitude};
use crate::core::{PcmBuffer, SpectrumResult, ThresholdState, Trigger};
use crate::error::{ReedError, Result};
use crate::storage::RecordingSummary;

pub fn print_threshold(state: &ThresholdState) {
    match state {
        ThresholdState::Set {
            rms_threshold,
            reference_power,
        } => {
            println!("  Threshold: {:.6}", rms_threshold);
            println!("  Reference Power: {:.3e}", reference_power);
        }
        ThresholdState::Unset => {
            println!("  Threshold: {}", "unset (run `reedrev calibrate`)".yellow());
        }
    }
}

pub fn print_trigger(trigger: &Trigger) {
    match trigger {
        Trigger::Saved(path) => println!("  Status: {} {}", "✓ SAVED".green(), path.display()),
        Trigger::BelowThreshold => println!("  Status: {}", "· below threshold".yellow()),
        Trigger::ThresholdUnset => println!("  Status: {}", "⚠ not saved, threshold unset".red()),
    }
}

/// RMS, power and dB lines for one buffer
pub fn print_levels(buffer: &PcmBuffer, rms: &[f64], power: f64, db: Result<f64>, verbose: bool) {
    let rms: Vec<String> = rms.iter().map(|r| format!("{:.6}", r)).collect();
    println!("  RMS: [{}]", rms.join(", "));
    println!("  Power: {:.3e}", power);
    print_db(db);

    if verbose {
        println!("\n  Technical Details:");
        println!("    Frames: {}", buffer.frames());
        println!("    Duration: {:.3}s", buffer.duration_secs());
        println!(
            "    Peak Amplitude: {:.1} dBFS",
            amplitude_to_db(peak_amplitude(buffer.samples()) as f64)
        );
    }
}

fn print_db(db: Result<f64>) {
    match db {
        Ok(db) => println!("  Level: {:+.1} dB re. baseline", db),
        Err(ReedError::MissingReferencePower) => {
            println!("  Level: {}", "n/a (no baseline power)".yellow())
        }
        Err(e) => println!("  Level: {}", e.to_string().red()),
    }
}

/// Full audible band and the low band where a reed's fundamentals sit
const PEAK_BANDS_HZ: [f64; 2] = [20_000.0, 4_000.0];

/// Peak frequency of every channel within each display band
pub fn print_peaks(spectrum: &SpectrumResult) {
    for ch in 0..spectrum.magnitudes.len() {
        let peaks: Vec<String> = PEAK_BANDS_HZ
            .iter()
            .filter_map(|&band| {
                spectrum
                    .peak_frequency_below(ch, band)
                    .map(|f| format!("{:.1} Hz (0-{} kHz)", f, band / 1000.0))
            })
            .collect();
        if !peaks.is_empty() {
            println!("  Peak Frequency (ch {}): {}", ch, peaks.join(", "));
        }
    }
}

pub fn print_summary(summary: &RecordingSummary) {
    let fp = &summary.fingerprint;
    println!("{}", summary.path.display().to_string().cyan());
    println!(
        "  Reed: {}",
        fp.subject_id.as_deref().unwrap_or("(baseline)")
    );
    println!("  Saved: {} ({})", fp.saved_at(), fp.save_time);
    println!("  Sample Rate: {} Hz", fp.sample_rate);
    println!("  Channels: {}", summary.channels);
    println!("  Frames: {}", summary.frames);
    println!("  Duration: {:.3}s", summary.duration_secs);
    println!("  Threshold: {:.6}", fp.rms_threshold);
}

/// One-line listing used by `review`
pub fn review_line(save_time: String, rms0: f64, power: f64, db: Result<f64>) -> String {
    let db = match db {
        Ok(db) => format!("{:+7.1} dB", db),
        Err(_) => "    n/a   ".to_string(),
    };
    format!("  {}  rms {:.6}  power {:.3e}  {}", save_time, rms0, power, db)
}
