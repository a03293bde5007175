// src/storage/fingerprint.rs
//
// Metadata bound to every persisted recording so it can be reattributed
// if it is ever separated from its directory.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current on-disk fingerprint layout
pub const FINGERPRINT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub version: u32,
    /// Reed the recording belongs to; baselines are not bound to a reed
    #[serde(rename = "id", default)]
    pub subject_id: Option<String>,
    /// Nanoseconds since the Unix epoch; also the archive file stem
    pub save_time: u64,
    #[serde(rename = "Fs")]
    pub sample_rate: u32,
    /// Threshold the recording was judged against
    #[serde(rename = "rms_thresh")]
    pub rms_threshold: f64,
    pub channels: usize,
}

impl Fingerprint {
    pub fn new(
        subject_id: Option<String>,
        save_time: u64,
        sample_rate: u32,
        channels: usize,
        rms_threshold: f64,
    ) -> Self {
        Self {
            version: FINGERPRINT_VERSION,
            subject_id,
            save_time,
            sample_rate,
            rms_threshold,
            channels,
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.subject_id.is_none()
    }

    /// Save time formatted as local wall-clock time, for display
    pub fn saved_at(&self) -> String {
        let secs = (self.save_time / 1_000_000_000) as i64;
        let nanos = (self.save_time % 1_000_000_000) as u32;
        chrono::DateTime::from_timestamp(secs, nanos)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.save_time.to_string())
    }
}

/// Wall-clock time since the Unix epoch in nanoseconds
pub fn epoch_nanos() -> u64 {
    let now = Utc::now();
    now.timestamp().max(0) as u64 * 1_000_000_000 + now.timestamp_subsec_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys() {
        let fp = Fingerprint::new(Some("7".to_string()), 1_700_000_000_123_456_789, 44100, 2, 0.0125);
        let json = serde_json::to_value(&fp).unwrap();

        assert_eq!(json["id"], "7");
        assert_eq!(json["save_time"], 1_700_000_000_123_456_789u64);
        assert_eq!(json["Fs"], 44100);
        assert_eq!(json["rms_thresh"], 0.0125);
        assert_eq!(json["version"], FINGERPRINT_VERSION);
    }

    #[test]
    fn test_baseline_has_no_id() {
        let fp = Fingerprint::new(None, 1, 44100, 2, 0.0);
        assert!(fp.is_baseline());

        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }

    #[test]
    fn test_epoch_nanos_advances() {
        let a = epoch_nanos();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = epoch_nanos();
        assert!(b > a);
        // After 2020-01-01
        assert!(a > 1_577_836_800_000_000_000);
    }
}
