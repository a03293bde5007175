//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SessionConfig;
use crate::core::DEFAULT_REED;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "reedrev")]
#[command(about = "Record, threshold and archive reed samples to track how a reed develops")]
pub struct Args {
    /// Settings file (defaults to <config dir>/reedrev/config.toml)
    #[arg(long, global = true, env = "REEDREV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding baseline, subject and archive recordings
    #[arg(long, global = true, env = "REEDREV_DATA")]
    pub data_root: Option<PathBuf>,

    /// Capture length in seconds
    #[arg(short, long, global = true)]
    pub duration: Option<f64>,

    /// Pause before each capture, in milliseconds
    #[arg(long, global = true)]
    pub guard_ms: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record the quiet room and set the save threshold from it
    Calibrate {
        /// Multiple of baseline RMS a take must exceed to be saved
        #[arg(short, long)]
        sensitivity: Option<f64>,
    },

    /// Record takes for a reed, saving those that cross the threshold
    Listen {
        /// Reed identifier
        #[arg(short, long, default_value = DEFAULT_REED)]
        reed: String,

        /// Number of takes to record
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Also print the strongest frequency of each take
        #[arg(long)]
        spectrum: bool,
    },

    /// List every saved recording for a reed
    Review {
        #[arg(short, long, default_value = DEFAULT_REED)]
        reed: String,
    },

    /// Show the fingerprint and statistics of one archive
    Inspect { archive: PathBuf },

    /// Write an archive's recording out as a WAV file
    Export { archive: PathBuf, output: PathBuf },

    /// Move the current baseline into the archive directory
    RotateBaseline,

    /// List audio input devices
    Devices,

    /// Print the effective settings as TOML
    Config,
}

impl Args {
    /// File settings with command-line overrides applied
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::load_default()?,
        };

        if let Some(root) = &self.data_root {
            config = config.with_data_root(root);
        }
        if let Some(duration) = self.duration {
            config = config.with_duration(duration);
        }
        if let Some(ms) = self.guard_ms {
            config = config.with_guard_delay_ms(ms);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("config.toml");
        let root = dir.path().join("data");

        let args = Args::parse_from([
            "reedrev",
            "--config",
            cfg.to_str().unwrap(),
            "--data-root",
            root.to_str().unwrap(),
            "--duration",
            "0.5",
            "listen",
            "--reed",
            "7",
            "-n",
            "3",
        ]);

        let config = args.session_config().unwrap();
        assert_eq!(config.data_root, root);
        assert_eq!(config.duration_secs, 0.5);

        match args.command {
            Command::Listen { reed, count, spectrum } => {
                assert_eq!(reed, "7");
                assert_eq!(count, 3);
                assert!(!spectrum);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_reed_defaults() {
        let args = Args::parse_from(["reedrev", "review"]);
        match args.command {
            Command::Review { reed } => assert_eq!(reed, DEFAULT_REED),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_duration_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("config.toml");
        let args = Args::parse_from(["reedrev", "--config", cfg.to_str().unwrap(), "--duration", "0", "devices"]);
        assert!(args.session_config().is_err());
    }
}
