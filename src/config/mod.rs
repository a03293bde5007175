//! Configuration module for reedrev

mod settings;

pub use settings::{config_path, SessionConfig, DATA_DIR_NAME};
