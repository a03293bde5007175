// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{Args, Command};

use anyhow::{Context, Result};
use colorful::Colorful;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

use crate::config::{config_path, SessionConfig};
use crate::core::{list_input_devices, ReedSession, SignalAnalyzer, ThresholdCalibrator, DEFAULT_REED};
use crate::storage::{export_wav, Namespace, RecordingStore};

/// Run one subcommand
pub fn run(args: Args) -> Result<()> {
    let config = args.session_config().context("Failed to load settings")?;
    let verbose = args.verbose;

    match args.command {
        Command::Calibrate { sensitivity } => {
            calibrate(config.clone(), sensitivity.unwrap_or(config.sensitivity), verbose)
        }
        Command::Listen { reed, count, spectrum } => listen(config, &reed, count, spectrum, verbose),
        Command::Review { reed } => review(&config, &reed),
        Command::Inspect { archive } => inspect(&config, &archive),
        Command::Export { archive, output } => {
            let store = RecordingStore::new(&config.data_root);
            let (buffer, _) = store.load(&archive)?;
            export_wav(&buffer, &output)
                .with_context(|| format!("Failed to export {}", output.display()))?;
            println!("Wrote {}", output.display().to_string().cyan());
            Ok(())
        }
        Command::RotateBaseline => {
            let store = RecordingStore::new(&config.data_root);
            match store.archive_baseline()? {
                Some(path) => println!("Archived baseline to {}", path.display().to_string().cyan()),
                None => println!("{}", "No baseline to archive".yellow()),
            }
            Ok(())
        }
        Command::Devices => {
            let devices = list_input_devices()?;
            if devices.is_empty() {
                println!("{}", "No input devices found!".red());
            }
            for name in devices {
                println!("  {}", name);
            }
            Ok(())
        }
        Command::Config => {
            if let Some(path) = config_path() {
                println!("# {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&config).context("Failed to serialise settings")?);
            Ok(())
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn calibrate(config: SessionConfig, sensitivity: f64, verbose: bool) -> Result<()> {
    println!(
        "Recording room baseline for {:.2}s, keep the room quiet",
        config.duration_secs
    );

    let mut session = ReedSession::open(DEFAULT_REED, config)?;
    let bar = spinner("recording baseline...");
    let result = session.calibrate(sensitivity);
    bar.finish_and_clear();
    let calibration = result.context("Calibration failed")?;

    println!("Baseline saved to {}", calibration.path.display().to_string().cyan());
    output::print_threshold(&calibration.state);

    if let (Some(buffer), Some(rms), Some(power)) =
        (session.last_buffer(), session.last_rms(), session.last_power())
    {
        output::print_levels(buffer, &rms, power, session.db_of(power), verbose);
    }
    Ok(())
}

fn listen(config: SessionConfig, reed: &str, count: usize, spectrum: bool, verbose: bool) -> Result<()> {
    let mut session = ReedSession::open(reed, config)?;

    println!("Reed {}", session.id().to_string().cyan());
    output::print_threshold(&session.threshold());

    for take in 1..=count {
        println!("\nTake {}/{}", take, count);

        let bar = spinner("recording...");
        let result = session.listen();
        bar.finish_and_clear();
        let trigger = result.context("Capture failed")?.trigger;

        output::print_trigger(&trigger);
        if let (Some(buffer), Some(rms), Some(power)) =
            (session.last_buffer(), session.last_rms(), session.last_power())
        {
            output::print_levels(buffer, &rms, power, session.db_of(power), verbose);
        }

        if spectrum {
            if let Some(spec) = session.last_spectrum() {
                output::print_peaks(&spec);
            }
        }
    }

    Ok(())
}

fn review(config: &SessionConfig, reed: &str) -> Result<()> {
    let store = RecordingStore::new(&config.data_root);
    let analyzer = SignalAnalyzer::new();
    let threshold = ThresholdCalibrator::new(config.sensitivity).load(&store, &analyzer)?;

    let namespace = Namespace::subject(reed)?;
    let entries = store.list(&namespace)?;

    println!(
        "Reed {}: {} recording(s) in {}",
        reed.cyan(),
        entries.len(),
        store.namespace_dir(&namespace).display()
    );

    for entry in entries {
        match store.load(&entry.path) {
            Ok((buffer, fingerprint)) => {
                let rms = analyzer.rms(&buffer);
                let power = analyzer.power(&buffer, 0);
                println!(
                    "{}",
                    output::review_line(
                        fingerprint.saved_at(),
                        rms.first().copied().unwrap_or(0.0),
                        power,
                        threshold.db_relative(power),
                    )
                );
            }
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }

    Ok(())
}

fn inspect(config: &SessionConfig, archive: &Path) -> Result<()> {
    let store = RecordingStore::new(&config.data_root);
    let summary = store.inspect(archive)?;
    output::print_summary(&summary);

    let (buffer, _) = store.load(archive)?;
    let mut analyzer = SignalAnalyzer::new();
    let rms = analyzer.rms(&buffer);
    let power = analyzer.power(&buffer, 0);
    let threshold = ThresholdCalibrator::new(config.sensitivity).load(&store, &analyzer)?;
    output::print_levels(&buffer, &rms, power, threshold.db_relative(power), true);

    output::print_peaks(&analyzer.spectrum(&buffer));
    Ok(())
}
